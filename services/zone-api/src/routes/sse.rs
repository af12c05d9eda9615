use actix_web::web::Bytes;
use actix_web::{HttpResponse, get, web};
use futures_util::stream::unfold;
use tracing::{debug, warn};
use zone_messaging::{BusError, BusEvent};

use crate::state::AppState;

/// Streams `zone_entered` events to the client as they are published.
#[get("/v1/stream/sse")]
pub async fn sse(state: web::Data<AppState>) -> HttpResponse {
    let receiver = state.bus.subscribe();
    debug!(subscribers = state.bus.subscriber_count(), "sse client connected");

    let stream = unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(envelope) if matches!(envelope.payload, BusEvent::ZoneEntered(_)) => {
                    match BusEvent::to_sse_frame(&envelope) {
                        Ok(frame) => {
                            return Some((Ok::<Bytes, actix_web::Error>(Bytes::from(frame)), receiver));
                        }
                        Err(err) => warn!(error = %err, "failed to encode sse frame"),
                    }
                }
                Ok(_) => {}
                Err(BusError::Lagged(skipped)) => warn!(skipped, "sse client lagged"),
                Err(BusError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/event-stream"))
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(stream)
}
