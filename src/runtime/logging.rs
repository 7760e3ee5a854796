use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LoggingSettings, state_dir};

fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .file
        .clone()
        .or_else(|| state_dir().map(|d| d.join("tunebox.log")))
}

/// Install the global subscriber. Output goes to a file because stdout belongs
/// to the TUI; when the file can't be opened, events are discarded.
pub fn init(settings: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let file = log_path(settings).and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let registry = tracing_subscriber::registry().with(filter);
    // A subscriber may already be installed (tests); keep it.
    let _ = match file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .try_init(),
    };
}
