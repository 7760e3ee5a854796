//! The playback primitive: a media-element abstraction and its rodio backend.
//!
//! `MediaElement` is the command/query surface the player controller drives.
//! `AudioElement` implements it on top of a dedicated audio thread that
//! reports state changes back as `MediaEvent`s.

mod blobs;
mod element;
mod player;
mod sink;
mod thread;
mod types;

pub use element::MediaElement;
pub use player::AudioElement;
pub use types::*;

#[cfg(test)]
mod tests;
