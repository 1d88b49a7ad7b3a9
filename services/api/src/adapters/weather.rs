//! services/api/src/adapters/weather.rs
//!
//! This module contains the simulated weather backend.
//! It implements the `WeatherProvider` port from the `core` crate, producing
//! plausible Philippine conditions after an artificial network delay.

use async_trait::async_trait;
use climatech_core::domain::{Location, WeatherCondition, WeatherSnapshot};
use climatech_core::ports::{PortResult, WeatherProvider};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `WeatherProvider` port with random figures.
pub struct SimulatedWeatherAdapter {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedWeatherAdapter {
    /// Creates a new `SimulatedWeatherAdapter`.
    pub fn new(latency: Duration) -> Self {
        Self::with_rng(latency, StdRng::from_entropy())
    }

    pub fn with_rng(latency: Duration, rng: StdRng) -> Self {
        Self {
            latency,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> WeatherSnapshot {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut pick = |(lo, hi): (i32, i32)| rng.gen_range(lo..=hi);
        let temperature_c = pick(WeatherSnapshot::TEMPERATURE_C);
        let humidity_pct = pick(WeatherSnapshot::HUMIDITY_PCT);
        let wind_kph = pick(WeatherSnapshot::WIND_KPH);
        let visibility_km = pick(WeatherSnapshot::VISIBILITY_KM);
        let uv_index = pick(WeatherSnapshot::UV_INDEX);
        let pressure_hpa = pick(WeatherSnapshot::PRESSURE_HPA);
        let condition = *WeatherCondition::ALL
            .choose(&mut *rng)
            .unwrap_or(&WeatherCondition::PartlyCloudy);
        WeatherSnapshot {
            temperature_c,
            humidity_pct,
            wind_kph,
            visibility_km,
            condition,
            uv_index,
            pressure_hpa,
        }
    }
}

//=========================================================================================
// `WeatherProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl WeatherProvider for SimulatedWeatherAdapter {
    /// Waits out the simulated latency, then returns fresh conditions.
    /// The location is ignored; a real backend would query by coordinates.
    async fn fetch_weather(&self, location: &Location) -> PortResult<WeatherSnapshot> {
        tokio::time::sleep(self.latency).await;
        let snapshot = self.roll();
        debug!(place = %location.name, ?snapshot, "Simulated weather generated");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climatech_core::domain::Coordinates;

    #[tokio::test(start_paused = true)]
    async fn figures_stay_within_documented_ranges() {
        let adapter =
            SimulatedWeatherAdapter::with_rng(Duration::from_secs(1), StdRng::seed_from_u64(3));
        let here = Location::new(Coordinates::new(8.95, 125.54), "Butuan City, Agusan del Norte");
        for _ in 0..200 {
            let snapshot = adapter.fetch_weather(&here).await.unwrap();
            assert!(snapshot.is_within_ranges(), "{snapshot:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_waits_for_the_simulated_latency() {
        let adapter = SimulatedWeatherAdapter::new(Duration::from_millis(1000));
        let here = Location::new(Coordinates::new(14.6, 121.0), "Manila, Metro Manila");
        let started = tokio::time::Instant::now();
        adapter.fetch_weather(&here).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
