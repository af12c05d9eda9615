use serde::{Deserialize, Serialize};
use zone_core::{
    CorrelationId, EntityStateChange, EpochMillis, MessageId, ZoneChange, ZoneEntered,
    now_epoch_millis,
};

mod bus;
pub use bus::{BusError, BusReceiver, EventBus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub message_id: MessageId,
    pub correlation_id: Option<CorrelationId>,
    pub sent_at_ms: EpochMillis,
    pub source_service: String,
}

impl MessageMetadata {
    pub fn new(source_service: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(),
            correlation_id: None,
            sent_at_ms: now_epoch_millis(),
            source_service: source_service.into(),
        }
    }

    pub fn with_correlation(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    pub metadata: MessageMetadata,
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum BusEvent {
    EntityStateChanged(EntityStateChange),
    ZoneChanged(ZoneChange),
    ZoneEntered(ZoneEntered),
}

impl BusEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EntityStateChanged(_) => "entity_state_changed",
            Self::ZoneChanged(_) => "zone_changed",
            Self::ZoneEntered(_) => "zone_entered",
        }
    }

    /// Renders the envelope as one server-sent event frame.
    pub fn to_sse_frame(envelope: &MessageEnvelope<BusEvent>) -> Result<String, serde_json::Error> {
        let data = serde_json::to_string(envelope)?;
        Ok(format!(
            "event: {}\nid: {}\ndata: {}\n\n",
            envelope.payload.event_type(),
            envelope.metadata.message_id,
            data
        ))
    }
}
