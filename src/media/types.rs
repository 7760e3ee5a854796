//! Value types shared by the media element, its backend and the controller.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Handle for in-memory media registered with the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(pub(crate) String);

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the element reads media bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    Object(ObjectUrl),
}

/// Confidence answer of a format-support query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CanPlay {
    No,
    Maybe,
    Probably,
}

impl CanPlay {
    pub fn as_str(self) -> &'static str {
        match self {
            CanPlay::No => "",
            CanPlay::Maybe => "maybe",
            CanPlay::Probably => "probably",
        }
    }
}

/// Error codes reported by the element.
pub const MEDIA_ERR_ABORTED: u16 = 1;
pub const MEDIA_ERR_NETWORK: u16 = 2;
pub const MEDIA_ERR_DECODE: u16 = 3;
pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

/// Runtime error state of the element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("media error {code}: {message}")]
pub struct MediaError {
    pub code: u16,
    /// Optional detail text; empty when the backend has none.
    pub message: String,
}

impl MediaError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Fixed human-readable description for this error's code.
    pub fn description(&self) -> &'static str {
        match self.code {
            MEDIA_ERR_ABORTED => "Media playback aborted.",
            MEDIA_ERR_NETWORK => "Network error while fetching media.",
            MEDIA_ERR_DECODE => "Decoding error — possibly unsupported format or corrupted file.",
            MEDIA_ERR_SRC_NOT_SUPPORTED => "Media format not supported by the browser.",
            _ => "Unknown media error.",
        }
    }

    /// Status line text: description, detail in parentheses, then the code.
    pub fn status_text(&self) -> String {
        let more = if self.message.is_empty() {
            String::new()
        } else {
            format!(" ({})", self.message)
        };
        format!(
            "Audio error: {}{} (code {})",
            self.description(),
            more,
            self.code
        )
    }
}

/// Why a `play()` request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct PlayRejection {
    /// Failure category, e.g. `NotAllowedError` or `NotSupportedError`.
    pub name: String,
    pub message: String,
}

impl PlayRejection {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new("NotSupportedError", message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new("NotAllowedError", message)
    }

    /// The request was overtaken by a later `load()`.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new("AbortError", message)
    }
}

/// Notifications emitted by the element, delivered in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Position (or duration) changed.
    TimeUpdate,
    /// Duration became known.
    LoadedMetadata,
    /// Playback reached the end of the source.
    Ended,
    /// Playback stalled while data is prepared.
    Waiting,
    /// Playback started or resumed.
    Playing,
    /// Playback paused.
    Pause,
    /// `error()` now holds a new error.
    Error,
    /// A `play()` request succeeded.
    PlayResolved,
    /// A `play()` request was refused.
    PlayRejected(PlayRejection),
}

/// MIME type implied by a file name's extension, for the format probe.
pub fn mime_for_name(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".m4a") || lower.ends_with(".mp4") {
        Some("audio/mp4")
    } else if lower.ends_with(".aac") {
        Some("audio/aac")
    } else if lower.ends_with(".mp3") {
        Some("audio/mpeg")
    } else {
        None
    }
}
