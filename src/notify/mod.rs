//! # Change Notification
//!
//! Observers learn that data behind a URI changed. Delivery is best-effort:
//! the router logs and drops notification failures, and no notifier may
//! block the caller.

pub mod errors;
pub mod event;

pub use errors::{NotifyError, NotifyResult};
pub use event::{ChangeEvent, ChangeKind};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::uri::ResourceUri;

/// Sink for "data at this URI changed" signals
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, uri: &ResourceUri, kind: ChangeKind) -> NotifyResult<()>;
}

/// Notifier that drops every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _uri: &ResourceUri, _kind: ChangeKind) -> NotifyResult<()> {
        Ok(())
    }
}

/// Notifier publishing [`ChangeEvent`]s on an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<ChangeEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel
    pub fn new() -> (Self, UnboundedReceiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Whether the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn notify(&self, uri: &ResourceUri, kind: ChangeKind) -> NotifyResult<()> {
        self.sender
            .send(ChangeEvent::new(uri.clone(), kind))
            .map_err(|_| NotifyError::Closed)
    }
}
