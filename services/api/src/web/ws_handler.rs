//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns one `SessionEngine` and delegates long-running work
//! to spawned tasks.

use crate::{
    adapters::{geolocation::ReportedPosition, map::ClientMapSink, MapCommand},
    web::{
        protocol::{send_server_message, ClientMessage, ServerMessage, WsSender},
        state::AppState,
        turn_task::{location_process, turn_process},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use climatech_core::{Coordinates, SessionEngine, SessionEvent};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "New WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let (map_tx, map_rx) = mpsc::unbounded_channel();
    let map_sink = Arc::new(ClientMapSink::new(map_tx));
    let engine = Arc::new(
        SessionEngine::start(app_state.engine_services(map_sink), app_state.timing()).await,
    );
    let events = engine.subscribe();

    let init_msg = ServerMessage::SessionInitialized {
        session: engine.overview().await,
    };
    if !send_server_message(&ws_sender, &init_msg).await {
        error!(%connection_id, "Failed to send session initialized message.");
        engine.shutdown();
        return;
    }

    let forwarder = tokio::spawn(forward_updates(
        engine.clone(),
        events,
        map_rx,
        ws_sender.clone(),
    ));

    // --- 2. Main Message Loop ---
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                in_flight.retain(|handle| !handle.is_finished());
                handle_text_message(text.as_str(), &engine, &ws_sender, &mut in_flight).await;
            }
            Message::Close(_) => {
                info!(%connection_id, "Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    engine.shutdown();
    for handle in in_flight {
        if let Err(e) = handle.await {
            warn!(%connection_id, "Session task ended abnormally: {}", e);
        }
    }
    forwarder.abort();
    info!(%connection_id, "WebSocket connection closed.");
}

/// Pushes session events and map commands to the client until either source closes.
async fn forward_updates(
    engine: Arc<SessionEngine>,
    mut events: broadcast::Receiver<SessionEvent>,
    mut map_commands: mpsc::UnboundedReceiver<MapCommand>,
    ws_sender: WsSender,
) {
    loop {
        let msg = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => ServerMessage::from(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Client fell behind; resending full session state.");
                    ServerMessage::SessionInitialized {
                        session: engine.overview().await,
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            command = map_commands.recv() => match command {
                Some(command) => ServerMessage::MapCommand { command },
                None => break,
            },
        };
        if !send_server_message(&ws_sender, &msg).await {
            break;
        }
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: &str,
    engine: &Arc<SessionEngine>,
    ws_sender: &WsSender,
    in_flight: &mut Vec<JoinHandle<()>>,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let msg = ServerMessage::Error {
                message: format!("Unrecognised message: {}", e),
            };
            send_server_message(ws_sender, &msg).await;
            return;
        }
    };

    match client_msg {
        ClientMessage::SendMessage { text } => {
            // Accepted inline so frames take the response gate in arrival order.
            match engine.accept(&text).await {
                Ok(turn) => in_flight.push(tokio::spawn(turn_process(engine.clone(), turn))),
                Err(e) => {
                    warn!("Submission rejected: {}", e);
                    let msg = ServerMessage::Error {
                        message: e.to_string(),
                    };
                    send_server_message(ws_sender, &msg).await;
                }
            }
        }
        ClientMessage::ShareLocation { lat, lng } => {
            let position = ReportedPosition::granted(Coordinates::new(lat, lng));
            spawn_location_request(engine, ws_sender, position, in_flight);
        }
        ClientMessage::LocationDenied => {
            spawn_location_request(engine, ws_sender, ReportedPosition::denied(), in_flight);
        }
        ClientMessage::LocationUnsupported => {
            spawn_location_request(engine, ws_sender, ReportedPosition::unsupported(), in_flight);
        }
        ClientMessage::LoadBranch { through_message_id } => {
            match engine.branch_through(&through_message_id).await {
                Ok(true) => info!(message_id = %through_message_id, "Loaded history branch."),
                Ok(false) => {
                    let msg = ServerMessage::Error {
                        message: format!("No message with id {}", through_message_id),
                    };
                    send_server_message(ws_sender, &msg).await;
                }
                Err(e) => {
                    let msg = ServerMessage::Error {
                        message: e.to_string(),
                    };
                    send_server_message(ws_sender, &msg).await;
                }
            }
        }
        ClientMessage::MarkNotificationRead { id } => {
            if !engine.mark_read(&id).await {
                info!(notification_id = %id, "Notification already read or unknown.");
            }
        }
        ClientMessage::SetMapMode { mode } => engine.set_map_mode(mode).await,
    }
}

fn spawn_location_request(
    engine: &Arc<SessionEngine>,
    ws_sender: &WsSender,
    position: ReportedPosition,
    in_flight: &mut Vec<JoinHandle<()>>,
) {
    in_flight.push(tokio::spawn(location_process(
        engine.clone(),
        ws_sender.clone(),
        position,
    )));
}
