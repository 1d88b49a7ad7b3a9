//! crates/climatech_core/src/responses.rs
//!
//! Canned bot replies. Every reply has a fixed structure; only the place name
//! and weather figures vary.

use crate::domain::{Location, WeatherSnapshot};
use crate::intent::Intent;

pub const GREETING: &str = "Hello! I'm ClimaTech AI, your weather assistant for the Philippines. I can provide real-time weather updates, forecasts, and climate information. How can I help you today?";

pub const LOCATION_PROMPT: &str = "To provide accurate weather information for your area, I need access to your location. Would you like me to request location permission?";

pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported by this browser.";

pub const LOCATION_DENIED: &str = "Location access denied. I can still provide general weather information for the Philippines. Please specify a city or region.";

pub const WEATHER_DISCLAIMER: &str = "I can provide weather information for any location in the Philippines. Please specify a city or allow location access for personalized updates.";

pub const PHILIPPINES_CLIMATE: &str = "The Philippines has a tropical maritime climate with three main seasons: dry (December-May), wet (June-November), and cool dry (December-February). The country experiences monsoons and is prone to typhoons. What specific information would you like about Philippine weather patterns?";

pub const FORECAST: &str = "Here's the 3-day forecast for your area:\n\n🌅 Tomorrow: 28°C, Partly cloudy, 20% rain\n🌤️ Day 2: 30°C, Sunny, 10% rain\n⛅ Day 3: 26°C, Cloudy, 60% rain\n\nWould you like more detailed information for any specific day?";

pub const HELP: &str = "I'm here to help with weather and climate information for the Philippines. You can ask me about current conditions, forecasts, typhoon updates, or general climate patterns. How can I assist you?";

/// Summary appended after a successful location grant.
pub fn location_granted(location: &Location, weather: &WeatherSnapshot) -> String {
    format!(
        "Great! I've located you in {name}. Here's your current weather:\n\n\
         🌡️ Temperature: {temp}°C\n\
         💧 Humidity: {humidity}%\n\
         💨 Wind Speed: {wind} km/h\n\
         👁️ Visibility: {visibility} km\n\
         ☀️ UV Index: {uv}\n\
         🌤️ Condition: {condition}\n\
         🧭 Pressure: {pressure} hPa\n\n\
         The map has been updated to show your location. What would you like to know about the weather?",
        name = location.name,
        temp = weather.temperature_c,
        humidity = weather.humidity_pct,
        wind = weather.wind_kph,
        visibility = weather.visibility_km,
        uv = weather.uv_index,
        condition = weather.condition,
        pressure = weather.pressure_hpa,
    )
}

/// Summary appended when the location resolved but the provider failed.
pub fn location_without_weather(location: &Location) -> String {
    format!(
        "Great! I've located you in {}. Current weather data is unavailable right now, please ask again in a moment. The map has been updated to show your location.",
        location.name
    )
}

pub fn current_weather(location: &Location, weather: &WeatherSnapshot) -> String {
    format!(
        "Current weather in {name}:\n\
         🌡️ {temp}°C - {condition}\n\
         💧 Humidity: {humidity}%\n\
         💨 Wind: {wind} km/h\n\
         Pressure: {pressure} hPa\n\n\
         Would you like a detailed forecast or information about other areas?",
        name = location.name,
        temp = weather.temperature_c,
        condition = weather.condition,
        humidity = weather.humidity_pct,
        wind = weather.wind_kph,
        pressure = weather.pressure_hpa,
    )
}

/// The reply for a classified intent, using the last known location and weather.
pub fn reply_for(
    intent: Intent,
    location: Option<&Location>,
    weather: Option<&WeatherSnapshot>,
) -> String {
    match intent {
        Intent::WeatherQuery => match (location, weather) {
            (Some(location), Some(weather)) => current_weather(location, weather),
            _ => WEATHER_DISCLAIMER.to_string(),
        },
        Intent::PhilippinesClimateInfo => PHILIPPINES_CLIMATE.to_string(),
        Intent::ForecastQuery => FORECAST.to_string(),
        Intent::Smalltalk => HELP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, WeatherCondition};

    fn sample() -> (Location, WeatherSnapshot) {
        let location = Location::new(Coordinates::new(8.95, 125.54), "Butuan City, Agusan del Norte");
        let weather = WeatherSnapshot {
            temperature_c: 31,
            humidity_pct: 77,
            wind_kph: 12,
            visibility_km: 10,
            condition: WeatherCondition::LightRain,
            uv_index: 8,
            pressure_hpa: 1012,
        };
        (location, weather)
    }

    #[test]
    fn granted_summary_lists_every_figure() {
        let (location, weather) = sample();
        let text = location_granted(&location, &weather);
        for needle in [
            "Butuan City, Agusan del Norte",
            "31°C",
            "77%",
            "12 km/h",
            "10 km",
            "UV Index: 8",
            "Light Rain",
            "1012 hPa",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in {text}");
        }
    }

    #[test]
    fn weather_reply_needs_both_location_and_snapshot() {
        let (location, weather) = sample();
        assert_eq!(
            reply_for(Intent::WeatherQuery, Some(&location), None),
            WEATHER_DISCLAIMER
        );
        let reply = reply_for(Intent::WeatherQuery, Some(&location), Some(&weather));
        assert!(reply.starts_with("Current weather in Butuan City"));
    }
}
