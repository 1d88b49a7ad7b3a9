//! services/api/src/adapters/map.rs
//!
//! The map widget lives in the browser. This adapter implements the `MapSink`
//! port by queueing commands for the WebSocket writer to forward.

use climatech_core::domain::{Coordinates, Location, MapDisplayMode};
use climatech_core::ports::MapSink;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// A single instruction for the client-side map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MapCommand {
    SetCenter { lat: f64, lng: f64 },
    SetZoom { level: u8 },
    SetDisplayMode { mode: MapDisplayMode },
    PlaceMarker { location: Location },
}

/// Forwards map commands to one connected client.
#[derive(Clone)]
pub struct ClientMapSink {
    commands: UnboundedSender<MapCommand>,
}

impl ClientMapSink {
    pub fn new(commands: UnboundedSender<MapCommand>) -> Self {
        Self { commands }
    }

    fn send(&self, command: MapCommand) {
        if self.commands.send(command).is_err() {
            debug!("Map command dropped; the client is gone.");
        }
    }
}

impl MapSink for ClientMapSink {
    fn set_center(&self, coords: Coordinates) {
        self.send(MapCommand::SetCenter {
            lat: coords.lat,
            lng: coords.lng,
        });
    }

    fn set_zoom(&self, level: u8) {
        self.send(MapCommand::SetZoom { level });
    }

    fn set_display_mode(&self, mode: MapDisplayMode) {
        self.send(MapCommand::SetDisplayMode { mode });
    }

    fn place_marker(&self, location: &Location) {
        self.send(MapCommand::PlaceMarker {
            location: location.clone(),
        });
    }
}
