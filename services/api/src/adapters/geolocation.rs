//! services/api/src/adapters/geolocation.rs
//!
//! The browser runs the platform geolocation call and reports what its
//! callback produced. This adapter replays that report through the
//! `GeolocationService` port.

use async_trait::async_trait;
use climatech_core::domain::Coordinates;
use climatech_core::ports::{GeolocationOutcome, GeolocationService};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedPosition {
    supported: bool,
    outcome: GeolocationOutcome,
}

impl ReportedPosition {
    pub fn granted(coords: Coordinates) -> Self {
        Self {
            supported: true,
            outcome: GeolocationOutcome::Granted(coords),
        }
    }

    pub fn denied() -> Self {
        Self {
            supported: true,
            outcome: GeolocationOutcome::Denied,
        }
    }

    /// The client has no geolocation capability at all.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            outcome: GeolocationOutcome::Denied,
        }
    }
}

#[async_trait]
impl GeolocationService for ReportedPosition {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> GeolocationOutcome {
        self.outcome
    }
}
