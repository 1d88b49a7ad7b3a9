//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the weather assistant chat.

use crate::adapters::map::MapCommand;
use axum::extract::ws::{Message, WebSocket};
use climatech_core::domain::{ConsentState, MapDisplayMode};
use climatech_core::{ResponsePhase, SessionEvent, SessionOverview};
use futures::{stream::SplitSink, SinkExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// The write half of a client connection, shared between the receive loop and
/// the background tasks it spawns.
pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A chat message typed by the user.
    SendMessage { text: String },

    /// The platform geolocation call succeeded with these coordinates.
    ShareLocation { lat: f64, lng: f64 },

    /// The user refused (or the platform failed) the geolocation request.
    LocationDenied,

    /// The client has no geolocation capability.
    LocationUnsupported,

    /// Rewind the conversation so it ends at the given message.
    LoadBranch { through_message_id: String },

    MarkNotificationRead { id: String },

    SetMapMode { mode: MapDisplayMode },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full session state, sent once on connect (and again if the client fell behind).
    SessionInitialized { session: SessionOverview },

    MessageAppended { message: climatech_core::Message },

    /// The log was replaced wholesale by a history rewind.
    LogReplaced { messages: Vec<climatech_core::Message> },

    /// A reply is being produced. The UI should disable the send button.
    ResponsePending,

    /// The pending reply has landed. The UI can re-enable sending.
    ResponseComplete,

    ConsentChanged { consent: ConsentState },

    NotificationsUpdated { unread_count: usize },

    /// An instruction for the map widget.
    MapCommand { command: MapCommand },

    /// Reports a rejected request; the session keeps running.
    Error { message: String },
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::MessageAppended { message } => ServerMessage::MessageAppended { message },
            SessionEvent::LogReplaced { messages } => ServerMessage::LogReplaced { messages },
            SessionEvent::PhaseChanged {
                phase: ResponsePhase::AwaitingResponse,
            } => ServerMessage::ResponsePending,
            SessionEvent::PhaseChanged {
                phase: ResponsePhase::Idle,
            } => ServerMessage::ResponseComplete,
            SessionEvent::ConsentChanged { consent } => ServerMessage::ConsentChanged { consent },
            SessionEvent::NotificationsChanged { unread } => ServerMessage::NotificationsUpdated {
                unread_count: unread,
            },
        }
    }
}

/// Serializes and sends one message. Returns `false` once the client is gone.
pub async fn send_server_message(ws_sender: &WsSender, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return false;
        }
    };
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_tagged_by_type() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"share_location","lat":8.95,"lng":125.54}"#).unwrap();
        assert_eq!(parsed, ClientMessage::ShareLocation { lat: 8.95, lng: 125.54 });

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"set_map_mode","mode":"satellite"}"#).unwrap();
        assert_eq!(parsed, ClientMessage::SetMapMode { mode: MapDisplayMode::Satellite });

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"reboot"}"#).is_err());
    }

    #[test]
    fn phase_events_become_pending_and_complete() {
        let pending = ServerMessage::from(SessionEvent::PhaseChanged {
            phase: ResponsePhase::AwaitingResponse,
        });
        assert_eq!(
            serde_json::to_string(&pending).unwrap(),
            r#"{"type":"response_pending"}"#
        );
        let done = ServerMessage::from(SessionEvent::PhaseChanged {
            phase: ResponsePhase::Idle,
        });
        assert_eq!(
            serde_json::to_string(&done).unwrap(),
            r#"{"type":"response_complete"}"#
        );
    }

    #[test]
    fn map_commands_nest_under_their_own_tag() {
        let message = ServerMessage::MapCommand {
            command: MapCommand::SetZoom { level: 12 },
        };
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"type":"map_command","command":{"action":"set_zoom","level":12}}"#
        );
    }
}
