use crate::application::timer::Phase;
use crate::domain::models::Session;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Events surfaced to the host UI instead of blocking dialogs or
/// console-only logging. Delivery is best-effort observability and
/// never drives control flow inside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A timer phase ran down; `next` names the phase the user should
    /// be notified about ("time to work" / "time for a break").
    PhaseEnded { finished: Phase, next: Phase },
    /// A completed work phase was persisted on the server.
    SessionRecorded(Session),
    /// The host must confirm before the delete request is issued.
    ConfirmDeleteRequested { task_id: String, title: String },
    /// A best-effort API call failed; local state was left unchanged.
    OperationFailed { operation: String, message: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);
}

/// Sink backed by a tokio unbounded channel. A closed receiver is
/// ignored: the host opting out of events must not break the core.
pub struct ChannelEventSink {
    sender: UnboundedSender<AppEvent>,
}

impl ChannelEventSink {
    pub fn pair() -> (Arc<Self>, UnboundedReceiver<AppEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }
}

/// Sink that stores events for later inspection. Used by tests and the
/// demo binary.
#[derive(Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<AppEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<AppEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: AppEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
