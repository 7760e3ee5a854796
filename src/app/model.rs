//! Player controller: binds the on-screen controls to a `MediaElement`.
//!
//! `App` forwards user intents (play/pause, volume, loop, seek, track
//! selection) to the element and keeps `PlayerView` in step with the
//! notifications the element reports back.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};

use crate::config::PlayerSettings;
use crate::hint::Hint;
use crate::keys::Shortcut;
use crate::library::Catalog;
use crate::media::{CanPlay, MediaElement, MediaEvent, MediaSource, ObjectUrl, mime_for_name};

/// Label of the play/pause button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlayLabel {
    #[default]
    Play,
    Pause,
}

impl PlayLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayLabel::Play => "Play",
            PlayLabel::Pause => "Pause",
        }
    }
}

/// Which control receives keys the global shortcuts leave alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    PlayButton,
    Volume,
    Loop,
    TrackSelector,
    ThemeToggle,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::PlayButton,
        Focus::Volume,
        Focus::Loop,
        Focus::TrackSelector,
        Focus::ThemeToggle,
    ];

    /// Form controls that consume arrow keys and space themselves.
    pub fn is_editable(self) -> bool {
        matches!(self, Focus::Volume | Focus::Loop | Focus::TrackSelector)
    }

    pub fn next(self) -> Self {
        match Self::ORDER.iter().position(|&f| f == self) {
            Some(p) => Self::ORDER[(p + 1) % Self::ORDER.len()],
            None => Self::ORDER[0],
        }
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        match Self::ORDER.iter().position(|&f| f == self) {
            Some(p) => Self::ORDER[(p + len - 1) % len],
            None => Self::ORDER[len - 1],
        }
    }
}

/// Everything the screen shows about the playback session.
#[derive(Clone, Debug, Default)]
pub struct PlayerView {
    pub play_label: PlayLabel,
    pub status: String,
    /// Fill of the progress bar, in percent.
    pub progress_pct: f64,
    pub elapsed: String,
    pub duration: String,
    pub track_name: String,
    /// Volume slider value, 0-100.
    pub volume: u8,
    pub loop_checked: bool,
    /// Selected catalog index.
    pub selected: usize,
}

/// Format seconds as `m:ss`; non-finite values read `0:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() {
        return "0:00".to_string();
    }
    let secs = secs.max(0.0);
    let m = (secs / 60.0).floor() as u64;
    let s = (secs % 60.0).floor() as u64;
    format!("{m}:{s:02}")
}

/// The player controller.
pub struct App<M: MediaElement> {
    media: M,
    catalog: Catalog,
    pub view: PlayerView,
    pub hint: Hint,
    pub focus: Focus,
    current_object_url: Option<ObjectUrl>,
    // Set by a play request, cleared by its answer or by a source switch.
    play_pending: bool,
}

impl<M: MediaElement> App<M> {
    /// Wire `media` to a fresh view: apply the slider value and loop flag,
    /// then load the initial catalog entry without starting playback.
    pub fn new(media: M, catalog: Catalog, settings: &PlayerSettings) -> Self {
        let mut app = Self {
            media,
            catalog,
            view: PlayerView {
                status: "Idle".to_string(),
                elapsed: format_time(0.0),
                duration: format_time(f64::NAN),
                ..PlayerView::default()
            },
            hint: Hint::new(Duration::from_millis(settings.hint_ms)),
            focus: Focus::None,
            current_object_url: None,
            play_pending: false,
        };

        app.view.volume = settings.volume.min(100);
        app.media.set_volume(f64::from(app.view.volume) / 100.0);
        app.media.set_loop(settings.looping);
        app.view.loop_checked = app.media.is_loop();

        if app.catalog.is_empty() {
            app.view.status = "No tracks".to_string();
            return app;
        }

        let index = settings
            .initial_source
            .as_deref()
            .and_then(|name| app.catalog.position_by_file_name(name))
            .unwrap_or(0);
        if let Some(track) = app.catalog.get(index).cloned() {
            app.view.selected = index;
            app.view.track_name = track.name;
            app.media.set_src(MediaSource::File(track.path));
            app.media.load();
        }
        app
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    #[cfg(test)]
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn has_tracks(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Start playback when paused, pause when playing.
    ///
    /// Starting is asynchronous: the button only flips once the element
    /// resolves the request.
    pub fn toggle_play_pause(&mut self, now: Instant) {
        if self.media.paused() {
            self.play_pending = true;
            self.media.play();
        } else {
            self.media.pause();
            self.view.play_label = PlayLabel::Play;
            self.view.status = "Paused".to_string();
            self.hint.show("Paused", now);
        }
    }

    /// Set the slider value (clamped to 0-100) and apply it to the element.
    pub fn set_volume(&mut self, value: i32, now: Instant) {
        let value = value.clamp(0, 100) as u8;
        self.view.volume = value;
        self.media.set_volume(f64::from(value) / 100.0);
        let text = format!("Volume: {value}%");
        self.view.status = text.clone();
        self.hint.show(text, now);
    }

    pub fn adjust_volume(&mut self, delta: i32, now: Instant) {
        self.set_volume(i32::from(self.view.volume) + delta, now);
    }

    pub fn set_loop(&mut self, looping: bool, now: Instant) {
        self.media.set_loop(looping);
        self.view.loop_checked = looping;
        self.hint.show(if looping { "Loop on" } else { "Loop off" }, now);
    }

    pub fn toggle_loop(&mut self, now: Instant) {
        let looping = !self.view.loop_checked;
        self.set_loop(looping, now);
    }

    /// Seek to the fraction `x_offset / width` of the track.
    ///
    /// No-op when the duration is unknown or unbounded.
    pub fn seek(&mut self, x_offset: f64, width: f64) {
        if width <= 0.0 {
            return;
        }
        let fraction = x_offset / width;
        let duration = self.media.duration();
        if duration.is_finite() {
            self.media.set_current_time(fraction * duration);
        }
    }

    fn release_object_url(&mut self) {
        if let Some(url) = self.current_object_url.take() {
            self.media.revoke_object_url(&url);
        }
    }

    fn load_source(&mut self, src: MediaSource, name: &str, now: Instant) {
        self.media.set_src(src);
        self.view.track_name = name.to_string();
        self.media.load();
        // Switching tracks never autoplays, and a play request still in
        // flight belongs to the previous source.
        self.play_pending = false;
        self.media.pause();
        self.view.play_label = PlayLabel::Play;
        self.view.progress_pct = 0.0;
        self.view.elapsed = format_time(0.0);
        self.view.duration = format_time(f64::NAN);
        self.view.status = format!("Loaded {name}");
        self.hint.show(format!("Loaded: {name}"), now);
        self.probe_format(name, now);
    }

    /// Advisory format check; never blocks loading or playback.
    fn probe_format(&mut self, name: &str, now: Instant) {
        let Some(mime) = mime_for_name(name) else {
            return;
        };
        match self.media.can_play_type(mime) {
            CanPlay::No => {
                tracing::warn!(name, mime, "format probably unsupported");
                self.view.status =
                    format!("Loaded {name} — player may not support this format ({mime}).");
                self.hint.show("Unsupported format", now);
            }
            support => tracing::debug!(mime, support = support.as_str(), "format probe"),
        }
    }

    /// Load the catalog entry at `index`, paused.
    pub fn select_track(&mut self, index: usize, now: Instant) {
        let Some(track) = self.catalog.get(index).cloned() else {
            return;
        };
        self.release_object_url();
        self.view.selected = index;
        self.load_source(MediaSource::File(track.path), &track.name, now);
    }

    pub fn next_track(&mut self, now: Instant) {
        if let Some(next) = self.catalog.next_index(self.view.selected) {
            self.select_track(next, now);
        }
    }

    pub fn prev_track(&mut self, now: Instant) {
        if let Some(prev) = self.catalog.prev_index(self.view.selected) {
            self.select_track(prev, now);
        }
    }

    /// Load in-memory media through an object URL, released on the next switch.
    ///
    /// When the catalog lists a file of the same name, that entry becomes the
    /// selected one.
    pub fn open_bytes(&mut self, name: &str, bytes: Vec<u8>, now: Instant) {
        self.release_object_url();
        if let Some(index) = self.catalog.position_by_file_name(name) {
            self.view.selected = index;
        }
        let url = self.media.create_object_url(bytes);
        self.current_object_url = Some(url.clone());
        self.load_source(MediaSource::Object(url), name, now);
    }

    #[cfg(test)]
    pub fn current_object_url(&self) -> Option<&ObjectUrl> {
        self.current_object_url.as_ref()
    }

    /// Reflect an element notification into the view.
    pub fn handle_media_event(&mut self, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::TimeUpdate => {
                let duration = self.media.duration();
                if !duration.is_finite() || duration <= 0.0 {
                    return;
                }
                let position = self.media.current_time();
                self.view.progress_pct = position / duration * 100.0;
                self.view.elapsed = format_time(position);
            }
            MediaEvent::LoadedMetadata => {
                self.view.duration = format_time(self.media.duration());
            }
            MediaEvent::Ended => {
                if !self.media.is_loop() {
                    self.view.play_label = PlayLabel::Play;
                    self.view.status = "Ended".to_string();
                }
            }
            MediaEvent::Waiting => {
                if self.play_pending {
                    self.view.status = "Buffering...".to_string();
                }
            }
            MediaEvent::Playing => {
                if !self.media.paused() {
                    self.view.status = "Playing".to_string();
                }
            }
            MediaEvent::Pause => self.view.status = "Paused".to_string(),
            MediaEvent::Error => {
                let Some(err) = self.media.error() else {
                    return;
                };
                tracing::error!(code = err.code, message = %err.message, "audio element error");
                self.view.status = err.status_text();
                self.hint.show("Audio error", now);
            }
            MediaEvent::PlayResolved => {
                if !std::mem::take(&mut self.play_pending) {
                    tracing::debug!("ignoring play resolution for a replaced source");
                    return;
                }
                self.view.play_label = PlayLabel::Pause;
                self.view.status = "Playing".to_string();
                self.hint.show("Playing", now);
            }
            MediaEvent::PlayRejected(rejection) => {
                if !std::mem::take(&mut self.play_pending) {
                    tracing::debug!(
                        name = %rejection.name,
                        "ignoring play rejection for a replaced source"
                    );
                    return;
                }
                tracing::error!(name = %rejection.name, message = %rejection.message, "playback start rejected");
                self.view.play_label = PlayLabel::Play;
                self.view.status = if rejection.message.is_empty() {
                    format!("Playback error: {}", rejection.name)
                } else {
                    format!("Playback error: {} - {}", rejection.name, rejection.message)
                };
                self.hint.show("Play blocked", now);
            }
        }
    }

    pub fn apply_shortcut(&mut self, shortcut: Shortcut, now: Instant) {
        match shortcut {
            Shortcut::TogglePlayPause => self.toggle_play_pause(now),
            Shortcut::Volume(delta) => self.adjust_volume(delta, now),
            Shortcut::NextTrack => self.next_track(now),
            Shortcut::PrevTrack => self.prev_track(now),
        }
    }

    /// Default key handling of the focused control. Returns true when consumed.
    pub fn handle_focused_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        let volume = i32::from(self.view.volume);
        match (self.focus, key.code) {
            (Focus::PlayButton, KeyCode::Enter) => self.toggle_play_pause(now),

            (Focus::Volume, KeyCode::Left | KeyCode::Down) => self.set_volume(volume - 1, now),
            (Focus::Volume, KeyCode::Right | KeyCode::Up) => self.set_volume(volume + 1, now),
            (Focus::Volume, KeyCode::PageDown) => self.set_volume(volume - 10, now),
            (Focus::Volume, KeyCode::PageUp) => self.set_volume(volume + 10, now),
            (Focus::Volume, KeyCode::Home) => self.set_volume(0, now),
            (Focus::Volume, KeyCode::End) => self.set_volume(100, now),

            (Focus::Loop, KeyCode::Char(' ')) => self.toggle_loop(now),

            (Focus::TrackSelector, KeyCode::Up | KeyCode::Left) => {
                if self.view.selected > 0 {
                    self.select_track(self.view.selected - 1, now);
                }
            }
            (Focus::TrackSelector, KeyCode::Down | KeyCode::Right) => {
                if self.view.selected + 1 < self.catalog.len() {
                    self.select_track(self.view.selected + 1, now);
                }
            }
            (Focus::TrackSelector, KeyCode::Home) => {
                if self.view.selected != 0 && self.has_tracks() {
                    self.select_track(0, now);
                }
            }
            (Focus::TrackSelector, KeyCode::End) => {
                let last = self.catalog.len().saturating_sub(1);
                if self.view.selected != last && self.has_tracks() {
                    self.select_track(last, now);
                }
            }
            _ => return false,
        }
        true
    }
}
