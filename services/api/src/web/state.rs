//! services/api/src/web/state.rs
//!
//! Defines the application's shared state. Per-connection state lives inside the
//! `SessionEngine` each WebSocket creates.

use crate::config::Config;
use climatech_core::ports::{
    IntentClassifier, LocationResolver, MapSink, SessionStore, SupportDesk, WeatherProvider,
};
use climatech_core::{EngineServices, ResponseTiming};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn SessionStore>,
    pub weather: Arc<dyn WeatherProvider>,
    pub resolver: Arc<dyn LocationResolver>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub support: Arc<dyn SupportDesk>,
}

impl AppState {
    /// Bundles the shared adapters with one connection's map sink.
    pub fn engine_services(&self, map: Arc<dyn MapSink>) -> EngineServices {
        EngineServices {
            store: self.store.clone(),
            weather: self.weather.clone(),
            resolver: self.resolver.clone(),
            classifier: self.classifier.clone(),
            map,
        }
    }

    pub fn timing(&self) -> ResponseTiming {
        self.config.response_timing()
    }
}
