//! User-facing notifications backed by a `tokio::sync::broadcast` channel.
//!
//! Forms and dialogs publish [`Toast`]s on a [`ToastBus`]; front-ends
//! subscribe and render them. The bus is cheap to clone and every clone
//! publishes to the same subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// A short message for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    /// When the toast was raised (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ToastBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out of toasts.
///
/// When the buffer is full the oldest unread toasts are dropped and slow
/// receivers observe `RecvError::Lagged`.
#[derive(Clone)]
pub struct ToastBus {
    sender: broadcast::Sender<Toast>,
}

impl ToastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody
    /// listens.
    pub fn publish(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, message = %toast.message, "Toast");
        let _ = self.sender.send(toast);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(Toast::new(ToastLevel::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(Toast::new(ToastLevel::Error, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(Toast::new(ToastLevel::Info, message));
    }
}

impl Default for ToastBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
