//! Transient on-screen messages.
//!
//! One toast is visible at a time; further messages wait in FIFO order. Time
//! only passes for the visible toast.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastLength {
    Short,
    Long,
    Custom(f32),
}

impl ToastLength {
    pub fn seconds(self) -> f32 {
        match self {
            Self::Short => 2.0,
            Self::Long => 3.5,
            Self::Custom(secs) => secs.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub remaining: f32,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    visible: Option<Toast>,
    pending: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, length: ToastLength) {
        let toast = Toast {
            text: text.into(),
            remaining: length.seconds(),
        };
        log::debug!("Toast queued: {}", toast.text);
        if self.visible.is_none() {
            self.visible = Some(toast);
        } else {
            self.pending.push_back(toast);
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let Some(current) = self.visible.as_mut() else {
            return;
        };
        current.remaining -= dt;
        if current.remaining <= 0.0 {
            self.visible = self.pending.pop_front();
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.visible.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_push_becomes_visible() {
        let mut queue = ToastQueue::new();
        assert!(queue.current().is_none());
        queue.push("hello", ToastLength::Short);
        assert_eq!(queue.current().map(|t| t.text.as_str()), Some("hello"));
        assert!(queue.pending.is_empty());
    }

    #[test]
    fn toasts_show_in_order() {
        let mut queue = ToastQueue::new();
        queue.push("a", ToastLength::Short);
        queue.push("b", ToastLength::Long);
        assert_eq!(queue.pending.len(), 1);

        queue.tick(1.9);
        assert_eq!(queue.current().map(|t| t.text.as_str()), Some("a"));
        queue.tick(0.2);
        assert_eq!(queue.current().map(|t| t.text.as_str()), Some("b"));

        // The queued toast's clock starts only once it is visible.
        queue.tick(3.4);
        assert!(queue.current().is_some());
        queue.tick(0.2);
        assert!(queue.current().is_none());
    }

    #[test]
    fn custom_length_is_not_negative() {
        assert_eq!(ToastLength::Custom(-1.0).seconds(), 0.0);
        assert_eq!(ToastLength::Custom(10.0).seconds(), 10.0);
    }

    #[test]
    fn tick_on_empty_queue_is_noop() {
        let mut queue = ToastQueue::new();
        queue.tick(5.0);
        assert!(queue.current().is_none());
    }
}
