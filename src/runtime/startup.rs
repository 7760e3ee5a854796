use std::env;
use std::path::{Path, PathBuf};

use crate::config;
use crate::library::{Catalog, scan};
use crate::theme::{FileStore, MemoryStore, PreferenceStore, ThemeController, system_prefers_dark};

/// What the command-line argument asks for.
#[derive(Debug, PartialEq, Eq)]
pub struct Launch {
    /// Directory scanned when the config lists no tracks.
    pub scan_dir: PathBuf,
    /// File opened from bytes right after startup.
    pub open_file: Option<PathBuf>,
}

impl Launch {
    pub fn from_arg(arg: Option<&Path>) -> Self {
        let cwd = || env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match arg {
            Some(p) if p.is_file() => Self {
                scan_dir: p
                    .parent()
                    .filter(|d| !d.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(cwd),
                open_file: Some(p.to_path_buf()),
            },
            Some(p) => Self {
                scan_dir: p.to_path_buf(),
                open_file: None,
            },
            None => Self {
                scan_dir: cwd(),
                open_file: None,
            },
        }
    }
}

/// Static tracks from the config, or the audio files found under `scan_dir`.
pub fn build_catalog(settings: &config::CatalogSettings, scan_dir: &Path) -> Catalog {
    if !settings.tracks.is_empty() {
        tracing::info!(tracks = settings.tracks.len(), "using configured catalog");
        return Catalog::from_entries(&settings.tracks);
    }
    let tracks = scan(scan_dir, settings);
    tracing::info!(dir = %scan_dir.display(), tracks = tracks.len(), "scanned catalog");
    Catalog::new(tracks)
}

/// Theme controller over the configured preference file.
///
/// Without a usable state directory the choice lives only for this session.
pub fn theme_controller(
    settings: &config::ThemeSettings,
) -> ThemeController<Box<dyn PreferenceStore>> {
    let path = settings
        .store_path
        .clone()
        .or_else(|| config::state_dir().map(|d| d.join("state.toml")));
    let store: Box<dyn PreferenceStore> = match path {
        Some(path) => Box::new(FileStore::open(path)),
        None => {
            tracing::warn!("no state directory; theme choice will not persist");
            Box::new(MemoryStore::default())
        }
    };
    ThemeController::new(store, system_prefers_dark(settings.system))
}
