//! Mock port implementations for the engine tests.

use crate::domain::{
    Coordinates, Feedback, IssueReport, Location, MapDisplayMode, WeatherCondition,
    WeatherSnapshot,
};
use crate::ports::{
    GeolocationOutcome, GeolocationService, MapSink, PortError, PortResult, SessionStore,
    SupportDesk, WeatherProvider,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sample_weather() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_c: 31,
        humidity_pct: 78,
        wind_kph: 11,
        visibility_km: 10,
        condition: WeatherCondition::PartlyCloudy,
        uv_index: 9,
        pressure_hpa: 1013,
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> PortResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.put(key, value);
        Ok(())
    }
}

// ============================================================================
// Weather
// ============================================================================

pub struct FixedWeather {
    snapshot: WeatherSnapshot,
    fail_next: AtomicBool,
    calls: AtomicUsize,
}

impl FixedWeather {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot,
            fail_next: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn fetch_weather(&self, _location: &Location) -> PortResult<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PortError::Unavailable("weather backend offline".to_string()));
        }
        Ok(self.snapshot.clone())
    }
}

// ============================================================================
// Geolocation
// ============================================================================

pub struct ScriptedGeolocation {
    supported: bool,
    outcome: GeolocationOutcome,
}

impl ScriptedGeolocation {
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

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            outcome: GeolocationOutcome::Denied,
        }
    }
}

#[async_trait]
impl GeolocationService for ScriptedGeolocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> GeolocationOutcome {
        self.outcome
    }
}

// ============================================================================
// Map
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Center(Coordinates),
    Zoom(u8),
    DisplayMode(MapDisplayMode),
    Marker(Location),
}

#[derive(Default)]
pub struct RecordingMap {
    calls: Mutex<Vec<MapCall>>,
}

impl RecordingMap {
    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MapCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MapSink for RecordingMap {
    fn set_center(&self, coords: Coordinates) {
        self.record(MapCall::Center(coords));
    }

    fn set_zoom(&self, level: u8) {
        self.record(MapCall::Zoom(level));
    }

    fn set_display_mode(&self, mode: MapDisplayMode) {
        self.record(MapCall::DisplayMode(mode));
    }

    fn place_marker(&self, location: &Location) {
        self.record(MapCall::Marker(location.clone()));
    }
}

// ============================================================================
// Support desk
// ============================================================================

#[derive(Default)]
pub struct RecordingDesk {
    pub feedback: Mutex<Vec<Feedback>>,
    pub reports: Mutex<Vec<IssueReport>>,
}

#[async_trait]
impl SupportDesk for RecordingDesk {
    async fn send_feedback(&self, feedback: &Feedback) -> bool {
        self.feedback.lock().unwrap().push(feedback.clone());
        true
    }

    async fn submit_report(&self, report: &IssueReport) -> bool {
        self.reports.lock().unwrap().push(report.clone());
        true
    }

    async fn sign_out(&self) -> bool {
        true
    }
}
