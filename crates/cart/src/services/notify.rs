//! Transient user notices raised by persistence edge cases.
//!
//! The engine decides *when* something is worth telling the user ("older
//! items were dropped to keep your cart saved"); the embedding surface
//! decides *how* (toast, banner, log line).

use std::cell::RefCell;
use std::rc::Rc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational; nothing was lost.
    Info,
    /// Something degraded but the cart is still usable.
    Warning,
    /// Data was lost or the cart had to start over.
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// How loud the surface should be about it.
    pub level: NoticeLevel,
    /// Human-readable text, ready to display.
    pub message: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// A degraded-but-usable notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// A data-loss notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives notices from the engine.
pub trait Notifier {
    /// Deliver one notice.
    fn notify(&self, notice: Notice);
}

/// Sharing a notifier between the session and the surface that displays
/// notices is the common case, so a reference-counted handle forwards.
impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Drops every notice. The default for headless embedders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Queues notices for a surface that polls and drains them.
#[derive(Debug, Default)]
pub struct BufferNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl BufferNotifier {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything queued so far, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    /// Whether anything is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
