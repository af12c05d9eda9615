use crate::{BusEvent, MessageEnvelope, MessageMetadata};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{trace, warn};
use zone_core::CorrelationId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("bus closed")]
    Closed,
    #[error("receiver lagged, {0} messages dropped")]
    Lagged(u64),
}

/// In-process state bus. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MessageEnvelope<BusEvent>>,
    source_service: String,
}

impl EventBus {
    pub fn new(source_service: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            source_service: source_service.into(),
        }
    }

    /// Publishes `event`, returning how many subscribers received it.
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: BusEvent) -> usize {
        self.send(MessageEnvelope {
            metadata: MessageMetadata::new(self.source_service.clone()),
            payload: event,
        })
    }

    pub fn publish_correlated(&self, event: BusEvent, correlation_id: CorrelationId) -> usize {
        self.send(MessageEnvelope {
            metadata: MessageMetadata::new(self.source_service.clone())
                .with_correlation(correlation_id),
            payload: event,
        })
    }

    pub fn subscribe(&self) -> BusReceiver {
        BusReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, envelope: MessageEnvelope<BusEvent>) -> usize {
        let event_type = envelope.payload.event_type();
        match self.sender.send(envelope) {
            Ok(receivers) => {
                trace!(event_type, receivers, "published bus event");
                receivers
            }
            Err(_) => {
                trace!(event_type, "published bus event without subscribers");
                0
            }
        }
    }
}

pub struct BusReceiver {
    receiver: broadcast::Receiver<MessageEnvelope<BusEvent>>,
}

impl BusReceiver {
    pub async fn recv(&mut self) -> Result<MessageEnvelope<BusEvent>, BusError> {
        match self.receiver.recv().await {
            Ok(envelope) => Ok(envelope),
            Err(broadcast::error::RecvError::Closed) => Err(BusError::Closed),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "bus receiver lagged");
                Err(BusError::Lagged(skipped))
            }
        }
    }
}
