//! Global keyboard shortcuts.
//!
//! Shortcuts apply only when no modifier (Control, Alt, Super, Meta) is held
//! and focus is not on an editable control; everything else is left for the
//! focused control to handle.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Focus;

/// Volume change per arrow-key press, in percent.
pub const VOLUME_STEP: i32 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shortcut {
    TogglePlayPause,
    /// Relative volume change in percent.
    Volume(i32),
    NextTrack,
    PrevTrack,
}

fn has_command_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(
        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META,
    )
}

/// Map a key press to a shortcut. `None` means the key was not consumed.
pub fn dispatch(key: &KeyEvent, focus: Focus) -> Option<Shortcut> {
    if has_command_modifier(key.modifiers) || focus.is_editable() {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') => Some(Shortcut::TogglePlayPause),
        KeyCode::Up => Some(Shortcut::Volume(VOLUME_STEP)),
        KeyCode::Down => Some(Shortcut::Volume(-VOLUME_STEP)),
        KeyCode::Right => Some(Shortcut::NextTrack),
        KeyCode::Left => Some(Shortcut::PrevTrack),
        _ => None,
    }
}
