use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::ingest::SkipReason;

/// Observable outcome of one record, or of the whole batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Skipped { name: String, reason: SkipReason },
    Generated { name: String },
    BatchComplete { archive_locator: String },
}

/// Status token on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireStatus {
    Generated,
    Ignored,
    Complete,
}

/// JSON shape observers receive.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: WireStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_locator: Option<String>,
}

impl ProgressEvent {
    pub fn to_wire(&self) -> WireEvent {
        match self {
            ProgressEvent::Skipped { name, reason } => WireEvent {
                name: Some(name.clone()),
                status: WireStatus::Ignored,
                reason: Some(reason.to_string()),
                message: Some(format!("'{name}' ignored: {reason}")),
                archive_locator: None,
            },
            ProgressEvent::Generated { name } => WireEvent {
                name: Some(name.clone()),
                status: WireStatus::Generated,
                reason: None,
                message: Some(format!("banners generated for '{name}'")),
                archive_locator: None,
            },
            ProgressEvent::BatchComplete { archive_locator } => WireEvent {
                name: None,
                status: WireStatus::Complete,
                reason: None,
                message: None,
                archive_locator: Some(archive_locator.clone()),
            },
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum always serializes.
        serde_json::to_string(&self.to_wire()).unwrap_or_default()
    }
}

/// Fan-out of progress events to any number of observers.
///
/// Subscribers only see events published after they subscribed.
#[derive(Default)]
pub struct ProgressBroadcaster {
    subscribers: Mutex<Vec<Sender<ProgressEvent>>>,
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ProgressEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, dropping the ones whose receiver is gone.
    pub fn publish(&self, event: ProgressEvent) {
        tracing::debug!(event = %event.to_json(), "progress");
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/progress.rs"]
mod tests;
