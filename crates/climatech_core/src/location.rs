//! crates/climatech_core/src/location.rs
//!
//! A stand-in reverse geocoder: one reference point matched within a fixed
//! tolerance, otherwise a random pick from a small gazetteer. The random source
//! is injected so callers can pin it.

use crate::domain::Coordinates;
use crate::ports::LocationResolver;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;
use tracing::debug;

/// Butuan City, the only point the resolver recognizes exactly.
pub const REFERENCE_POINT: Coordinates = Coordinates {
    lat: 8.9495,
    lng: 125.5406,
};
pub const REFERENCE_NAME: &str = "Butuan City, Agusan del Norte";

/// Degrees allowed on each axis for a reference match (exclusive).
pub const TOLERANCE_DEG: f64 = 0.5;

pub const GAZETTEER: [&str; 8] = [
    "Manila, Metro Manila",
    "Cebu City, Cebu",
    "Davao City, Davao del Sur",
    "Quezon City, Metro Manila",
    "Makati City, Metro Manila",
    "Baguio City, Benguet",
    "Iloilo City, Iloilo",
    "Cagayan de Oro, Misamis Oriental",
];

pub struct ReferencePointResolver {
    rng: Mutex<StdRng>,
}

impl ReferencePointResolver {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// A resolver whose fallback picks are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    fn is_near_reference(coords: Coordinates) -> bool {
        (coords.lat - REFERENCE_POINT.lat).abs() < TOLERANCE_DEG
            && (coords.lng - REFERENCE_POINT.lng).abs() < TOLERANCE_DEG
    }
}

impl LocationResolver for ReferencePointResolver {
    fn resolve(&self, coords: Coordinates) -> String {
        if Self::is_near_reference(coords) {
            return REFERENCE_NAME.to_string();
        }
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let name = GAZETTEER.choose(&mut *rng).copied().unwrap_or(GAZETTEER[0]);
        debug!(lat = coords.lat, lng = coords.lng, %name, "Coordinates outside reference tolerance");
        name.to_string()
    }
}
