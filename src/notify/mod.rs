//! Transient user-facing notifications.
//!
//! `ToastSink` is a process-wide broadcast channel: any part of the
//! application can publish a short message, and any number of UI
//! subscribers render whatever arrives. Messages auto-clear after a fixed
//! display window; a new message supersedes the pending clear of the
//! previous one. Subscribers only see events published after they
//! subscribe, and dropping a receiver is the unsubscribe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

/// How long a toast stays visible before it is cleared automatically.
const DISPLAY_WINDOW_MS: u64 = 3000;

/// Broadcast buffer size. Subscribers that lag behind this many events
/// miss the oldest ones, which is acceptable for transient messages.
const CHANNEL_CAPACITY: usize = 16;

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Toast {
    pub text: String,
    pub severity: Severity,
}

/// What subscribers receive: a toast to display, or the signal to clear
/// whatever is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEvent {
    Shown(Toast),
    Cleared,
}

/// Cloneable publishing handle. All clones share one channel and one
/// timer generation, so a `show` through any clone supersedes the
/// auto-clear scheduled by any other.
#[derive(Clone)]
pub struct ToastSink {
    tx: broadcast::Sender<ToastEvent>,
    generation: Arc<AtomicU64>,
}

impl ToastSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.tx.subscribe()
    }

    /// Publish a toast and schedule its automatic clear.
    ///
    /// Must be called from within a Tokio runtime; the auto-clear timer is
    /// a spawned task. A stale timer whose toast has been superseded does
    /// nothing.
    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let toast = Toast {
            text: text.into(),
            severity,
        };
        let current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // No subscribers is fine; the message simply goes nowhere.
        let _ = self.tx.send(ToastEvent::Shown(toast));

        let tx = self.tx.clone();
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(DISPLAY_WINDOW_MS)).await;
            if generation.load(Ordering::SeqCst) == current {
                let _ = tx.send(ToastEvent::Cleared);
            }
        });
    }

    /// Clear immediately, invalidating any pending auto-clear.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(ToastEvent::Cleared);
    }
}

impl Default for ToastSink {
    fn default() -> Self {
        Self::new()
    }
}
