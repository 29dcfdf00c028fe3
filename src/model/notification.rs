//! Dismissible user notifications with a time-to-live

use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

/// Used for write failures, whose server messages tend to be long
pub const EXTENDED_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
    created: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= self.ttl
    }
}

#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, level: Level, title: &str, message: impl Into<String>) {
        self.push_with_ttl(level, title, message, DEFAULT_TTL);
    }

    pub fn push_with_ttl(
        &mut self,
        level: Level,
        title: &str,
        message: impl Into<String>,
        ttl: Duration,
    ) {
        self.items.push(Notification {
            level,
            title: title.to_string(),
            message: message.into(),
            created: Instant::now(),
            ttl,
        });
    }

    pub fn info(&mut self, title: &str, message: impl Into<String>) {
        self.push(Level::Info, title, message);
    }

    pub fn success(&mut self, title: &str, message: impl Into<String>) {
        self.push(Level::Success, title, message);
    }

    pub fn warning(&mut self, title: &str, message: impl Into<String>) {
        self.push(Level::Warning, title, message);
    }

    pub fn error(&mut self, title: &str, message: impl Into<String>) {
        self.push(Level::Error, title, message);
    }

    /// Drop everything whose TTL has passed
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| !n.is_expired(now));
    }

    /// Dismiss the newest notification
    pub fn dismiss_latest(&mut self) -> Option<Notification> {
        self.items.pop()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_respects_ttl() {
        let mut notes = Notifications::new();
        notes.push_with_ttl(Level::Error, "Save failed", "boom", EXTENDED_TTL);
        notes.info("Loaded", "12 fields");

        let later = Instant::now() + DEFAULT_TTL + Duration::from_millis(10);
        notes.prune(later);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.latest().map(|n| n.level), Some(Level::Error));

        notes.prune(Instant::now() + EXTENDED_TTL + Duration::from_millis(10));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_dismiss_latest() {
        let mut notes = Notifications::new();
        notes.warning("First", "a");
        notes.error("Second", "b");
        assert_eq!(notes.dismiss_latest().map(|n| n.title), Some("Second".to_string()));
        assert_eq!(notes.latest().map(|n| n.title.as_str()), Some("First"));
    }
}
