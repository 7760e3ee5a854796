use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus};
use crate::icons::IconSlot;
use crate::keys;
use crate::media::{MediaElement, MediaEvent};
use crate::theme::{PreferenceStore, ThemeController};
use crate::ui::{self, Control, HitMap};

/// Longest wait for terminal input between redraws.
const TICK: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Control rectangles of the last drawn frame.
    pub hits: HitMap,
    /// A left-button press started on the volume slider.
    pub dragging_volume: bool,
}

/// Everything the loop drives besides the controller.
pub struct Surfaces<'a, S: PreferenceStore> {
    pub theme: &'a mut ThemeController<S>,
    pub icons: &'a [IconSlot],
    pub header_text: &'a str,
    pub media_events: &'a Receiver<MediaEvent>,
}

/// Main terminal event loop: expires hints, reflects media events, draws,
/// and dispatches input. Returns `Ok(())` when the user quits.
pub fn run<M: MediaElement, S: PreferenceStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App<M>,
    surfaces: &mut Surfaces<'_, S>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        app.hint.expire(now);

        // Notifications are handled in emission order.
        while let Ok(ev) = surfaces.media_events.try_recv() {
            app.handle_media_event(ev, now);
        }

        let chrome = ui::Chrome {
            theme: surfaces.theme.theme(),
            header_text: surfaces.header_text,
            icons: surfaces.icons,
        };
        terminal.draw(|f| state.hits = ui::draw(f, app, &chrome))?;

        // Wake up early enough to hide a pending hint on time.
        let mut timeout = TICK;
        if let Some(deadline) = app.hint.deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, app, surfaces.theme, Instant::now()) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, app, surfaces.theme, state, Instant::now());
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn toggle_theme<S: PreferenceStore>(theme: &mut ThemeController<S>) {
    match theme.toggle() {
        Ok(t) => tracing::info!(theme = t.as_str(), "theme toggled"),
        Err(e) => tracing::warn!(error = %e, "failed to persist theme choice"),
    }
}

/// Route one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event<M: MediaElement, S: PreferenceStore>(
    key: KeyEvent,
    app: &mut App<M>,
    theme: &mut ThemeController<S>,
    now: Instant,
) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('q') if key.modifiers.is_empty() => return true,
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return false;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return false;
        }
        KeyCode::Esc => {
            app.focus = Focus::None;
            return false;
        }
        _ => {}
    }

    if let Some(shortcut) = keys::dispatch(&key, app.focus) {
        app.apply_shortcut(shortcut, now);
    } else if app.focus == Focus::ThemeToggle && key.code == KeyCode::Enter {
        toggle_theme(theme);
    } else {
        app.handle_focused_key(&key, now);
    }
    false
}

/// Route one mouse event through the hit map of the last frame.
pub fn handle_mouse_event<M: MediaElement, S: PreferenceStore>(
    mouse: MouseEvent,
    app: &mut App<M>,
    theme: &mut ThemeController<S>,
    state: &mut EventLoopState,
    now: Instant,
) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            state.dragging_volume = false;
            match state.hits.control_at(mouse.column, mouse.row) {
                Some(Control::PlayButton) => {
                    app.focus = Focus::PlayButton;
                    app.toggle_play_pause(now);
                }
                Some(Control::Volume) => {
                    app.focus = Focus::Volume;
                    state.dragging_volume = true;
                    app.set_volume(state.hits.volume_at(mouse.column), now);
                }
                Some(Control::Loop) => {
                    app.focus = Focus::Loop;
                    app.toggle_loop(now);
                }
                Some(Control::Progress) => {
                    let (x, width) = state.hits.progress_offset(mouse.column);
                    app.seek(x, width);
                }
                Some(Control::Track(index)) => {
                    app.focus = Focus::TrackSelector;
                    if index != app.view.selected {
                        app.select_track(index, now);
                    }
                }
                Some(Control::ThemeToggle) => {
                    app.focus = Focus::ThemeToggle;
                    toggle_theme(theme);
                }
                None => {}
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.dragging_volume => {
            let value = state.hits.volume_at(mouse.column);
            if value != i32::from(app.view.volume) {
                app.set_volume(value, now);
            }
        }
        MouseEventKind::Up(_) => state.dragging_volume = false,
        _ => {}
    }
}
