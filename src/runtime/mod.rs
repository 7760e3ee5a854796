use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::icons::{self, FsFetcher};
use crate::library::file_name_of;
use crate::media::AudioElement;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, fallback) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(reason) = fallback {
        tracing::warn!("{reason}");
    }

    let arg = env::args_os().nth(1).map(PathBuf::from);
    let launch = startup::Launch::from_arg(arg.as_deref());
    let catalog = startup::build_catalog(&settings.catalog, &launch.scan_dir);

    let (media, media_events) = AudioElement::new();
    let mut app = App::new(media, catalog, &settings.player);

    if let Some(path) = &launch.open_file {
        match fs::read(path) {
            Ok(bytes) => app.open_bytes(&file_name_of(path), bytes, Instant::now()),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to open file"),
        }
    }

    let mut theme = startup::theme_controller(&settings.theme);
    let icon_slots = icons::normalize_all(
        &FsFetcher::new(settings.ui.assets_dir.clone()),
        &settings.ui.icons,
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        let mut surfaces = event_loop::Surfaces {
            theme: &mut theme,
            icons: &icon_slots,
            header_text: &settings.ui.header_text,
            media_events: &media_events,
        };
        event_loop::run(&mut terminal, &mut app, &mut surfaces, &mut state)
    })();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.media().shutdown();
    run_result
}
