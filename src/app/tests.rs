use super::*;
use crate::config::PlayerSettings;
use crate::keys::{self, Shortcut};
use crate::library::{Catalog, Track};
use crate::media::{
    CanPlay, MEDIA_ERR_DECODE, MediaElement, MediaError, MediaEvent, MediaSource, ObjectUrl,
    PlayRejection,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetSrc(MediaSource),
    Load,
    Play,
    Pause,
    Seek(f64),
    Revoke(ObjectUrl),
}

/// Scriptable element that records every command it receives.
#[derive(Debug)]
struct FakeMedia {
    calls: Vec<Call>,
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    looping: bool,
    error: Option<MediaError>,
    support: CanPlay,
    next_url: u32,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            looping: false,
            error: None,
            support: CanPlay::Probably,
            next_url: 0,
        }
    }
}

impl FakeMedia {
    fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn last_src(&self) -> Option<&MediaSource> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetSrc(src) => Some(src),
            _ => None,
        })
    }
}

impl MediaElement for FakeMedia {
    fn set_src(&mut self, src: MediaSource) {
        self.calls.push(Call::SetSrc(src));
    }
    fn load(&mut self) {
        self.calls.push(Call::Load);
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.paused = true;
        self.calls.push(Call::Pause);
    }
    fn paused(&self) -> bool {
        self.paused
    }
    fn current_time(&self) -> f64 {
        self.current_time
    }
    fn set_current_time(&mut self, secs: f64) {
        self.current_time = secs;
        self.calls.push(Call::Seek(secs));
    }
    fn duration(&self) -> f64 {
        self.duration
    }
    fn volume(&self) -> f64 {
        self.volume
    }
    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
    fn is_loop(&self) -> bool {
        self.looping
    }
    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
    fn can_play_type(&self, _mime: &str) -> CanPlay {
        self.support
    }
    fn error(&self) -> Option<MediaError> {
        self.error.clone()
    }
    fn create_object_url(&mut self, _bytes: Vec<u8>) -> ObjectUrl {
        self.next_url += 1;
        ObjectUrl(format!("blob:test/{}", self.next_url))
    }
    fn revoke_object_url(&mut self, url: &ObjectUrl) {
        self.calls.push(Call::Revoke(url.clone()));
    }
}

fn catalog(names: &[&str]) -> Catalog {
    Catalog::new(
        names
            .iter()
            .map(|n| Track::from_path(format!("media/{n}")))
            .collect(),
    )
}

fn app_with(names: &[&str], settings: PlayerSettings) -> App<FakeMedia> {
    App::new(FakeMedia::default(), catalog(names), &settings)
}

fn app(names: &[&str]) -> App<FakeMedia> {
    app_with(names, PlayerSettings::default())
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Route a key the way the event loop does.
fn press(app: &mut App<FakeMedia>, code: KeyCode, now: Instant) {
    let ev = key(code);
    if let Some(shortcut) = keys::dispatch(&ev, app.focus) {
        app.apply_shortcut(shortcut, now);
    } else {
        app.handle_focused_key(&ev, now);
    }
}

#[test]
fn new_loads_first_track_paused_with_initial_settings() {
    let settings = PlayerSettings {
        volume: 80,
        looping: true,
        ..PlayerSettings::default()
    };
    let app = app_with(&["a.mp3", "b.mp3"], settings);

    assert_eq!(app.view.selected, 0);
    assert_eq!(app.view.track_name, "a.mp3");
    assert_eq!(app.view.volume, 80);
    assert!((app.media().volume() - 0.8).abs() < 1e-9);
    assert!(app.media().is_loop());
    assert!(app.view.loop_checked);
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Idle");
    assert_eq!(
        app.media().last_src(),
        Some(&MediaSource::File("media/a.mp3".into()))
    );
    assert_eq!(app.media().count(&Call::Play), 0);
}

#[test]
fn new_matches_initial_source_by_file_name() {
    let settings = PlayerSettings {
        initial_source: Some("/elsewhere/b.mp3".into()),
        ..PlayerSettings::default()
    };
    let app = app_with(&["a.mp3", "b.mp3", "c.mp3"], settings);
    assert_eq!(app.view.selected, 1);
    assert_eq!(app.view.track_name, "b.mp3");
}

#[test]
fn new_with_empty_catalog_reports_no_tracks() {
    let mut app = app(&[]);
    assert_eq!(app.view.status, "No tracks");
    assert!(app.media().calls.is_empty());

    let now = Instant::now();
    app.next_track(now);
    app.prev_track(now);
    assert!(app.media().calls.is_empty());
}

#[test]
fn arrow_up_raises_volume_and_clamps_at_hundred() {
    let settings = PlayerSettings {
        volume: 80,
        ..PlayerSettings::default()
    };
    let mut app = app_with(&["a.mp3"], settings);
    let now = Instant::now();

    press(&mut app, KeyCode::Up, now);
    assert_eq!(app.view.volume, 85);
    assert!((app.media().volume() - 0.85).abs() < 1e-9);
    assert_eq!(app.view.status, "Volume: 85%");
    assert_eq!(app.hint.text(), "Volume: 85%");
    assert!(app.hint.is_visible());

    for _ in 0..19 {
        press(&mut app, KeyCode::Up, now);
    }
    assert_eq!(app.view.volume, 100);
    assert!((app.media().volume() - 1.0).abs() < 1e-9);
    assert_eq!(app.view.status, "Volume: 100%");
}

#[test]
fn arrow_right_on_last_track_wraps_and_loads_paused() {
    let settings = PlayerSettings {
        initial_source: Some("c.mp3".into()),
        ..PlayerSettings::default()
    };
    let mut app = app_with(&["a.mp3", "b.mp3", "c.mp3"], settings);
    app.media_mut().paused = false;
    app.view.play_label = PlayLabel::Pause;
    let loads_before = app.media().count(&Call::Load);

    press(&mut app, KeyCode::Right, Instant::now());

    assert_eq!(app.view.selected, 0);
    assert_eq!(app.view.track_name, "a.mp3");
    assert_eq!(app.media().count(&Call::Load), loads_before + 1);
    assert!(app.media().paused());
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Loaded a.mp3");
    assert_eq!(app.hint.text(), "Loaded: a.mp3");
    assert_eq!(app.view.elapsed, "0:00");
    assert_eq!(app.view.progress_pct, 0.0);
}

#[test]
fn arrow_left_on_first_track_wraps_to_last() {
    let mut app = app(&["a.mp3", "b.mp3", "c.mp3"]);
    press(&mut app, KeyCode::Left, Instant::now());
    assert_eq!(app.view.selected, 2);
    assert_eq!(app.view.track_name, "c.mp3");
}

#[test]
fn decode_error_shows_full_status_text() {
    let mut app = app(&["a.mp3"]);
    app.media_mut().error = Some(MediaError::new(MEDIA_ERR_DECODE, ""));

    app.handle_media_event(MediaEvent::Error, Instant::now());

    assert_eq!(
        app.view.status,
        "Audio error: Decoding error — possibly unsupported format or corrupted file. (code 3)"
    );
    assert_eq!(app.hint.text(), "Audio error");
}

#[test]
fn error_event_without_error_state_is_ignored() {
    let mut app = app(&["a.mp3"]);
    app.handle_media_event(MediaEvent::Error, Instant::now());
    assert_eq!(app.view.status, "Idle");
    assert!(!app.hint.is_visible());
}

#[test]
fn play_waits_for_resolution_before_flipping_label() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();

    press(&mut app, KeyCode::Char(' '), now);
    assert_eq!(app.media().count(&Call::Play), 1);
    assert_eq!(app.view.play_label, PlayLabel::Play);

    app.media_mut().paused = false;
    app.handle_media_event(MediaEvent::PlayResolved, now);
    assert_eq!(app.view.play_label, PlayLabel::Pause);
    assert_eq!(app.view.status, "Playing");
    assert_eq!(app.hint.text(), "Playing");

    press(&mut app, KeyCode::Char(' '), now);
    assert!(app.media().paused());
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Paused");
    assert_eq!(app.hint.text(), "Paused");
}

#[test]
fn play_rejection_reports_name_and_message() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();

    press(&mut app, KeyCode::Char(' '), now);
    app.handle_media_event(
        MediaEvent::PlayRejected(PlayRejection::not_allowed("no output device")),
        now,
    );
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(
        app.view.status,
        "Playback error: NotAllowedError - no output device"
    );
    assert_eq!(app.hint.text(), "Play blocked");

    press(&mut app, KeyCode::Char(' '), now);
    app.handle_media_event(
        MediaEvent::PlayRejected(PlayRejection::not_supported("")),
        now,
    );
    assert_eq!(app.view.status, "Playback error: NotSupportedError");
}

#[test]
fn time_update_tracks_progress_when_duration_known() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    app.media_mut().duration = 200.0;
    app.media_mut().current_time = 50.0;

    app.handle_media_event(MediaEvent::LoadedMetadata, now);
    app.handle_media_event(MediaEvent::TimeUpdate, now);

    assert_eq!(app.view.duration, "3:20");
    assert_eq!(app.view.elapsed, "0:50");
    assert!((app.view.progress_pct - 25.0).abs() < 1e-9);
}

#[test]
fn time_update_is_skipped_for_unknown_or_unbounded_duration() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    app.media_mut().current_time = 42.0;

    for duration in [f64::NAN, f64::INFINITY, 0.0] {
        app.media_mut().duration = duration;
        app.handle_media_event(MediaEvent::TimeUpdate, now);
        assert_eq!(app.view.progress_pct, 0.0);
        assert_eq!(app.view.elapsed, "0:00");
    }
}

#[test]
fn seek_maps_offset_to_fraction_of_duration() {
    let mut app = app(&["a.mp3"]);
    app.media_mut().duration = 120.0;

    app.seek(25.0, 100.0);
    assert_eq!(app.media().calls.last(), Some(&Call::Seek(30.0)));
}

#[test]
fn seek_without_finite_duration_is_noop() {
    let mut app = app(&["a.mp3"]);
    app.seek(10.0, 100.0);
    app.media_mut().duration = f64::INFINITY;
    app.seek(10.0, 100.0);
    app.media_mut().duration = 100.0;
    app.seek(10.0, 0.0);
    assert!(!app.media().calls.iter().any(|c| matches!(c, Call::Seek(_))));
}

#[test]
fn ended_without_loop_resets_label() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    app.view.play_label = PlayLabel::Pause;

    app.handle_media_event(MediaEvent::Ended, now);
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Ended");
}

#[test]
fn ended_with_loop_leaves_view_alone() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    app.set_loop(true, now);
    app.view.play_label = PlayLabel::Pause;
    app.view.status = "Playing".into();

    app.handle_media_event(MediaEvent::Ended, now);
    assert_eq!(app.view.play_label, PlayLabel::Pause);
    assert_eq!(app.view.status, "Playing");
}

#[test]
fn loop_toggle_updates_element_and_hint() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();

    app.toggle_loop(now);
    assert!(app.media().is_loop());
    assert!(app.view.loop_checked);
    assert_eq!(app.hint.text(), "Loop on");

    app.toggle_loop(now);
    assert!(!app.media().is_loop());
    assert_eq!(app.hint.text(), "Loop off");
}

#[test]
fn transient_events_set_status() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    press(&mut app, KeyCode::Char(' '), now);
    app.handle_media_event(MediaEvent::Waiting, now);
    assert_eq!(app.view.status, "Buffering...");
    app.media_mut().paused = false;
    app.handle_media_event(MediaEvent::PlayResolved, now);
    app.handle_media_event(MediaEvent::Playing, now);
    assert_eq!(app.view.status, "Playing");
    app.handle_media_event(MediaEvent::Pause, now);
    assert_eq!(app.view.status, "Paused");
}

#[test]
fn unsupported_format_warns_but_still_loads() {
    let mut app = app(&["a.mp3", "b.m4a"]);
    app.media_mut().support = CanPlay::No;
    let now = Instant::now();

    app.select_track(1, now);

    assert_eq!(
        app.media().last_src(),
        Some(&MediaSource::File("media/b.m4a".into()))
    );
    assert_eq!(
        app.view.status,
        "Loaded b.m4a — player may not support this format (audio/mp4)."
    );
    assert_eq!(app.hint.text(), "Unsupported format");
}

#[test]
fn maybe_support_keeps_plain_loaded_status() {
    let mut app = app(&["a.mp3", "b.m4a"]);
    app.media_mut().support = CanPlay::Maybe;
    app.select_track(1, Instant::now());
    assert_eq!(app.view.status, "Loaded b.m4a");
}

#[test]
fn select_out_of_range_is_ignored() {
    let mut app = app(&["a.mp3"]);
    let calls = app.media().calls.len();
    app.select_track(5, Instant::now());
    assert_eq!(app.media().calls.len(), calls);
    assert_eq!(app.view.selected, 0);
}

#[test]
fn play_answer_arriving_after_switch_keeps_player_paused() {
    let mut app = app(&["a.mp3", "b.mp3", "c.mp3"]);
    let now = Instant::now();

    press(&mut app, KeyCode::Char(' '), now);
    press(&mut app, KeyCode::Right, now);
    // The element answered the earlier request before seeing the switch.
    app.handle_media_event(MediaEvent::Waiting, now);
    app.handle_media_event(MediaEvent::PlayResolved, now);
    app.handle_media_event(MediaEvent::Playing, now);

    assert!(app.media().paused());
    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Loaded b.mp3");
    assert_eq!(app.hint.text(), "Loaded: b.mp3");
}

#[test]
fn aborted_play_after_switch_is_not_reported() {
    let mut app = app(&["a.mp3", "b.mp3"]);
    let now = Instant::now();

    press(&mut app, KeyCode::Char(' '), now);
    app.select_track(1, now);
    app.handle_media_event(
        MediaEvent::PlayRejected(PlayRejection::aborted("interrupted by load")),
        now,
    );

    assert_eq!(app.view.play_label, PlayLabel::Play);
    assert_eq!(app.view.status, "Loaded b.mp3");

    // A fresh request on the new track is answered normally.
    press(&mut app, KeyCode::Char(' '), now);
    app.media_mut().paused = false;
    app.handle_media_event(MediaEvent::PlayResolved, now);
    assert_eq!(app.view.play_label, PlayLabel::Pause);
}

#[test]
fn opened_file_selects_matching_catalog_entry() {
    let mut app = app(&["a.mp3", "b.mp3", "c.mp3"]);
    let now = Instant::now();

    app.open_bytes("c.mp3", vec![0; 4], now);
    assert_eq!(app.view.selected, 2);
    assert_eq!(app.view.track_name, "c.mp3");

    app.next_track(now);
    assert_eq!(app.view.selected, 0);
    assert_eq!(app.view.track_name, "a.mp3");
}

#[test]
fn opened_file_outside_catalog_keeps_selection() {
    let mut app = app(&["a.mp3", "b.mp3"]);
    app.select_track(1, Instant::now());
    app.open_bytes("other.mp3", vec![0; 4], Instant::now());
    assert_eq!(app.view.selected, 1);
    assert_eq!(app.view.track_name, "other.mp3");
}

#[test]
fn object_url_is_revoked_on_next_switch() {
    let mut app = app(&["a.mp3", "b.mp3"]);
    let now = Instant::now();

    app.open_bytes("song.mp3", vec![1, 2, 3], now);
    let url = app.current_object_url().cloned().unwrap();
    assert_eq!(app.media().last_src(), Some(&MediaSource::Object(url.clone())));
    assert_eq!(app.view.track_name, "song.mp3");

    app.select_track(1, now);
    assert_eq!(app.media().count(&Call::Revoke(url)), 1);
    assert!(app.current_object_url().is_none());
}

#[test]
fn shortcuts_are_ignored_on_editable_focus() {
    let mut app = app(&["a.mp3", "b.mp3"]);
    let now = Instant::now();
    app.focus = Focus::Loop;

    press(&mut app, KeyCode::Up, now);
    press(&mut app, KeyCode::Right, now);
    assert_eq!(app.view.volume, 100);
    assert_eq!(app.view.selected, 0);

    // Space belongs to the checkbox here.
    press(&mut app, KeyCode::Char(' '), now);
    assert!(app.view.loop_checked);
    assert_eq!(app.media().count(&Call::Play), 0);
}

#[test]
fn focused_volume_slider_steps() {
    let mut app = app_with(
        &["a.mp3"],
        PlayerSettings {
            volume: 50,
            ..PlayerSettings::default()
        },
    );
    let now = Instant::now();
    app.focus = Focus::Volume;

    press(&mut app, KeyCode::Up, now);
    assert_eq!(app.view.volume, 51);
    press(&mut app, KeyCode::PageDown, now);
    assert_eq!(app.view.volume, 41);
    press(&mut app, KeyCode::End, now);
    assert_eq!(app.view.volume, 100);
    press(&mut app, KeyCode::Home, now);
    assert_eq!(app.view.volume, 0);
    press(&mut app, KeyCode::Left, now);
    assert_eq!(app.view.volume, 0);
}

#[test]
fn focused_track_selector_does_not_wrap() {
    let mut app = app(&["a.mp3", "b.mp3", "c.mp3"]);
    let now = Instant::now();
    app.focus = Focus::TrackSelector;

    press(&mut app, KeyCode::Up, now);
    assert_eq!(app.view.selected, 0);
    press(&mut app, KeyCode::Down, now);
    assert_eq!(app.view.selected, 1);
    press(&mut app, KeyCode::End, now);
    assert_eq!(app.view.selected, 2);
    let loads = app.media().count(&Call::Load);
    press(&mut app, KeyCode::Right, now);
    assert_eq!(app.view.selected, 2);
    assert_eq!(app.media().count(&Call::Load), loads);
}

#[test]
fn play_button_focus_keeps_space_shortcut_and_enter() {
    let mut app = app(&["a.mp3"]);
    let now = Instant::now();
    app.focus = Focus::PlayButton;

    press(&mut app, KeyCode::Enter, now);
    assert_eq!(app.media().count(&Call::Play), 1);
    press(&mut app, KeyCode::Char(' '), now);
    assert_eq!(app.media().count(&Call::Play), 2);
}

#[test]
fn unhandled_focused_key_is_not_consumed() {
    let mut app = app(&["a.mp3"]);
    app.focus = Focus::Loop;
    assert!(!app.handle_focused_key(&key(KeyCode::Enter), Instant::now()));
}

#[test]
fn focus_cycles_through_controls() {
    let mut f = Focus::None;
    let mut seen = Vec::new();
    for _ in 0..5 {
        f = f.next();
        seen.push(f);
    }
    assert_eq!(
        seen,
        vec![
            Focus::PlayButton,
            Focus::Volume,
            Focus::Loop,
            Focus::TrackSelector,
            Focus::ThemeToggle
        ]
    );
    assert_eq!(f.next(), Focus::PlayButton);
    assert_eq!(Focus::PlayButton.prev(), Focus::ThemeToggle);
    assert_eq!(Focus::None.prev(), Focus::ThemeToggle);
}

#[test]
fn format_time_examples() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(59.9), "0:59");
    assert_eq!(format_time(61.0), "1:01");
    assert_eq!(format_time(3600.0), "60:00");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
}

#[test]
fn hint_expires_after_ttl() {
    let mut app = app(&["a.mp3"]);
    let t0 = Instant::now();
    app.toggle_loop(t0);
    assert!(app.hint.is_visible());
    app.hint.expire(t0 + Duration::from_millis(PlayerSettings::default().hint_ms));
    assert!(!app.hint.is_visible());
}

proptest! {
    #[test]
    fn volume_always_within_bounds(start in 0u8..=100, deltas in prop::collection::vec(-30i32..30, 0..40)) {
        let mut app = app_with(&["a.mp3"], PlayerSettings { volume: start, ..PlayerSettings::default() });
        let now = Instant::now();
        for d in deltas {
            app.apply_shortcut(Shortcut::Volume(d), now);
            prop_assert!(app.view.volume <= 100);
            let v = app.media().volume();
            prop_assert!((0.0..=1.0).contains(&v));
            prop_assert!((v - f64::from(app.view.volume) / 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn track_switches_always_leave_element_paused(steps in prop::collection::vec(any::<bool>(), 1..20)) {
        let mut app = app(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
        let now = Instant::now();
        for forward in steps {
            app.media_mut().paused = false;
            if forward { app.next_track(now) } else { app.prev_track(now) }
            prop_assert!(app.media().paused());
            prop_assert_eq!(app.view.play_label, PlayLabel::Play);
            prop_assert!(app.view.selected < 4);
        }
    }
}
