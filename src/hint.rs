//! Short-lived on-screen confirmation messages.

use std::time::{Duration, Instant};

/// A single auto-dismissing message. Showing a new hint replaces the text and
/// restarts the one pending deadline.
#[derive(Debug, Clone)]
pub struct Hint {
    text: String,
    visible: bool,
    deadline: Option<Instant>,
    ttl: Duration,
}

impl Hint {
    pub fn new(ttl: Duration) -> Self {
        Self {
            text: String::new(),
            visible: false,
            deadline: None,
            ttl,
        }
    }

    pub fn show(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.visible = true;
        self.deadline = Some(now + self.ttl);
    }

    /// Hide the hint once its deadline has passed. Returns true when it was hidden.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.visible = false;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(1400);

    #[test]
    fn hint_hides_after_ttl() {
        let t0 = Instant::now();
        let mut hint = Hint::new(TTL);
        hint.show("Playing", t0);
        assert!(hint.is_visible());
        assert!(!hint.expire(t0 + Duration::from_millis(1399)));
        assert!(hint.is_visible());
        assert!(hint.expire(t0 + TTL));
        assert!(!hint.is_visible());
        assert_eq!(hint.deadline(), None);
    }

    #[test]
    fn newer_hint_replaces_pending_deadline() {
        let t0 = Instant::now();
        let mut hint = Hint::new(TTL);
        hint.show("Volume: 85%", t0);
        let t1 = t0 + Duration::from_millis(1000);
        hint.show("Volume: 90%", t1);

        // The first hint's deadline passes without hiding anything.
        assert!(!hint.expire(t0 + TTL));
        assert!(hint.is_visible());
        assert_eq!(hint.text(), "Volume: 90%");

        assert!(hint.expire(t1 + TTL));
        assert!(!hint.is_visible());
        assert_eq!(hint.text(), "Volume: 90%");
    }

    #[test]
    fn expire_without_hint_is_noop() {
        let mut hint = Hint::new(TTL);
        assert!(!hint.expire(Instant::now()));
        assert!(!hint.is_visible());
    }
}
