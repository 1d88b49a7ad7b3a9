//! crates/climatech_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the session engine.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the weather backend, the storage engine, the map widget
//! and the platform geolocation call.

use crate::domain::{
    Coordinates, Feedback, IssueReport, Location, MapDisplayMode, WeatherSnapshot,
};
use crate::intent::Intent;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetches current conditions for a resolved location.
    async fn fetch_weather(&self, location: &Location) -> PortResult<WeatherSnapshot>;
}

pub trait LocationResolver: Send + Sync {
    /// Maps raw coordinates to a human-readable place name.
    fn resolve(&self, coords: Coordinates) -> String;
}

/// The answer delivered by the platform geolocation callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationOutcome {
    Granted(Coordinates),
    Denied,
}

#[async_trait]
pub trait GeolocationService: Send + Sync {
    /// Whether the platform offers geolocation at all.
    fn is_supported(&self) -> bool;

    /// Asks the platform for the current position. Fires once.
    async fn current_position(&self) -> GeolocationOutcome;
}

/// The map visualization sink. Every call is fire-and-forget.
pub trait MapSink: Send + Sync {
    fn set_center(&self, coords: Coordinates);
    fn set_zoom(&self, level: u8);
    fn set_display_mode(&self, mode: MapDisplayMode);
    fn place_marker(&self, location: &Location);
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads the raw value stored under `key`, if any.
    async fn load(&self, key: &str) -> PortResult<Option<String>>;

    /// Overwrites the value stored under `key`.
    async fn save(&self, key: &str, value: &str) -> PortResult<()>;
}

pub trait IntentClassifier: Send + Sync {
    /// Whether the text asks about weather in a way that needs the user's location.
    fn needs_location(&self, text: &str) -> bool;

    /// Picks the response intent for the text.
    fn classify(&self, text: &str) -> Intent;
}

/// Outbound acknowledgements. Each call only reports whether it was accepted.
#[async_trait]
pub trait SupportDesk: Send + Sync {
    async fn send_feedback(&self, feedback: &Feedback) -> bool;
    async fn submit_report(&self, report: &IssueReport) -> bool;
    async fn sign_out(&self) -> bool;
}
