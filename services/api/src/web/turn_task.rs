//! services/api/src/web/turn_task.rs
//!
//! The background work a connection spawns: reply delays and location requests.
//! Both can wait for seconds, so they run off the receive loop.

use crate::adapters::geolocation::ReportedPosition;
use crate::web::protocol::{send_server_message, ServerMessage, WsSender};
use climatech_core::{AcceptedTurn, ConsentOutcome, SessionEngine, TurnOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Finishes a turn the receive loop already accepted: waits out the reply
/// delay and appends the reply.
pub async fn turn_process(engine: Arc<SessionEngine>, turn: AcceptedTurn) {
    let turn_start = Instant::now();
    match engine.complete(turn).await {
        TurnOutcome::Replied { reply, .. } => {
            info!(
                reply_id = %reply.id,
                "⏱️ Turn completed in {:?}",
                turn_start.elapsed()
            );
        }
        TurnOutcome::Cancelled { user } => {
            info!(message_id = %user.id, "Turn cancelled before the reply landed.");
        }
    }
}

/// Feeds the client's geolocation report through the consent flow.
pub async fn location_process(
    engine: Arc<SessionEngine>,
    ws_sender: WsSender,
    position: ReportedPosition,
) {
    match engine.request_location(&position).await {
        Ok(ConsentOutcome::Granted { location, weather }) => {
            info!(
                place = %location.name,
                has_weather = weather.is_some(),
                "Location shared."
            );
        }
        Ok(ConsentOutcome::Denied) => info!("Location request denied."),
        Ok(ConsentOutcome::Unsupported) => info!("Geolocation unsupported on client."),
        Ok(ConsentOutcome::Cancelled) => info!("Location request cancelled."),
        Err(e) => {
            warn!("Location request rejected: {}", e);
            let msg = ServerMessage::Error {
                message: e.to_string(),
            };
            send_server_message(&ws_sender, &msg).await;
        }
    }
}
