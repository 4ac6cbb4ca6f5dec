//! Change notification for redraws, and transient user notices.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Revision counter bumped on every observable model change.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    revision: Rc<Cell<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.revision.set(self.revision.get().wrapping_add(1));
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// A subscription that has not yet seen the current revision.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            revision: Rc::clone(&self.revision),
            seen: None,
        }
    }
}

/// Observer side of a [`ChangeNotifier`].
#[derive(Debug)]
pub struct Subscription {
    revision: Rc<Cell<u64>>,
    seen: Option<u64>,
}

impl Subscription {
    /// True once per change (and on first poll). Marks the change as seen.
    pub fn take_changed(&mut self) -> bool {
        let current = self.revision.get();
        let changed = self.seen != Some(current);
        self.seen = Some(current);
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created: Instant,
}

/// Queue of notices that expire after a fixed time.
#[derive(Debug, Clone)]
pub struct Notices {
    ttl: Duration,
    items: Vec<Notice>,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, items: Vec::new() }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into(), Instant::now());
    }

    pub fn push(&mut self, level: NoticeLevel, message: String, created: Instant) {
        self.items.push(Notice { level, message, created });
    }

    /// Drop notices older than the TTL. Returns true if any were removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        let ttl = self.ttl;
        self.items.retain(|n| now.saturating_duration_since(n.created) < ttl);
        self.items.len() != before
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Time until the oldest notice expires.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.items
            .iter()
            .map(|n| self.ttl.saturating_sub(now.saturating_duration_since(n.created)))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_sees_each_change_once() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        assert!(sub.take_changed());
        assert!(!sub.take_changed());
        notifier.notify();
        notifier.notify();
        assert!(sub.take_changed());
        assert!(!sub.take_changed());
    }

    #[test]
    fn test_notices_expire() {
        let mut notices = Notices::new(Duration::from_secs(4));
        let start = Instant::now();
        notices.push(NoticeLevel::Error, "Failed to load scene".into(), start);
        notices.push(NoticeLevel::Info, "Saved".into(), start + Duration::from_secs(3));

        assert!(!notices.expire(start + Duration::from_secs(2)));
        assert_eq!(notices.len(), 2);

        assert!(notices.expire(start + Duration::from_secs(5)));
        let remaining: Vec<_> = notices.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(remaining, vec!["Saved"]);
        assert_eq!(notices.next_expiry(start + Duration::from_secs(5)), Some(Duration::from_secs(2)));
    }
}
