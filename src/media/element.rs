use super::types::{CanPlay, MediaError, MediaSource, ObjectUrl};

/// Command/query surface of a playback primitive.
///
/// Commands return immediately. `play()` reports its outcome later as
/// `MediaEvent::PlayResolved` or `MediaEvent::PlayRejected`; every other state
/// change is also announced through `MediaEvent`s.
pub trait MediaElement {
    /// Assign a new source. Takes effect on the next `load()`.
    fn set_src(&mut self, src: MediaSource);
    /// Reset the element and start loading the current source.
    fn load(&mut self);
    /// Request playback start.
    fn play(&mut self);
    /// Pause synchronously.
    fn pause(&mut self);
    fn paused(&self) -> bool;

    /// Current position in seconds.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, secs: f64);
    /// Duration in seconds; NaN when unknown, infinite for unbounded streams.
    fn duration(&self) -> f64;

    /// Volume as a fraction in `0.0..=1.0`.
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn is_loop(&self) -> bool;
    fn set_loop(&mut self, looping: bool);

    /// How likely the element is to play media of the given MIME type.
    fn can_play_type(&self, mime: &str) -> CanPlay;
    /// Most recent runtime error, cleared by `load()`.
    fn error(&self) -> Option<MediaError>;

    /// Register in-memory media and return a source handle for it.
    fn create_object_url(&mut self, bytes: Vec<u8>) -> ObjectUrl;
    /// Release media registered with `create_object_url`.
    fn revoke_object_url(&mut self, url: &ObjectUrl);
}
