//! crates/climatech_core/src/domain.rs
//!
//! Defines the pure, core data structures for the assistant.
//! These structs are independent of any transport or storage backend; the
//! serde attributes describe the persisted snapshot layout only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A raw coordinate pair as reported by the geolocation platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A resolved, human-readable location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    pub fn new(coords: Coordinates, name: impl Into<String>) -> Self {
        Self {
            lat: coords.lat,
            lng: coords.lng,
            name: name.into(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// A single entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Message {
    pub fn user(id: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            body: body.into(),
            created_at,
            location: None,
        }
    }

    pub fn bot(id: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            role: Role::Bot,
            body: body.into(),
            created_at,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    PartlyCloudy,
    Sunny,
    Cloudy,
    LightRain,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::PartlyCloudy,
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::LightRain,
    ];
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::LightRain => "Light Rain",
        };
        f.write_str(label)
    }
}

/// Current conditions at a location. Never persisted on its own; the figures
/// are embedded in the bot message text that reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: i32,
    pub humidity_pct: i32,
    pub wind_kph: i32,
    pub visibility_km: i32,
    pub condition: WeatherCondition,
    pub uv_index: i32,
    pub pressure_hpa: i32,
}

impl WeatherSnapshot {
    pub const TEMPERATURE_C: (i32, i32) = (25, 35);
    pub const HUMIDITY_PCT: (i32, i32) = (60, 90);
    pub const WIND_KPH: (i32, i32) = (5, 20);
    pub const VISIBILITY_KM: (i32, i32) = (8, 15);
    pub const UV_INDEX: (i32, i32) = (3, 11);
    pub const PRESSURE_HPA: (i32, i32) = (1010, 1030);

    /// Whether every figure lies within its documented inclusive range.
    pub fn is_within_ranges(&self) -> bool {
        let within = |v: i32, (lo, hi): (i32, i32)| (lo..=hi).contains(&v);
        within(self.temperature_c, Self::TEMPERATURE_C)
            && within(self.humidity_pct, Self::HUMIDITY_PCT)
            && within(self.wind_kph, Self::WIND_KPH)
            && within(self.visibility_km, Self::VISIBILITY_KM)
            && within(self.uv_index, Self::UV_INDEX)
            && within(self.pressure_hpa, Self::PRESSURE_HPA)
    }
}

/// The user's grant or denial of location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    #[default]
    Unrequested,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Weather,
    Alert,
    System,
}

/// A notice shown in the notification tray. Only `read` ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// How the map widget renders its base layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapDisplayMode {
    #[default]
    Weather,
    Satellite,
    Terrain,
}

/// Free-text feedback about the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Technical,
    DataInaccuracy,
    UserInterface,
    Performance,
    Other,
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportCategory::Technical => "Technical Issue",
            ReportCategory::DataInaccuracy => "Data Inaccuracy",
            ReportCategory::UserInterface => "User Interface Problem",
            ReportCategory::Performance => "Performance Issue",
            ReportCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

/// A problem report filed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    pub category: ReportCategory,
    pub description: String,
}
