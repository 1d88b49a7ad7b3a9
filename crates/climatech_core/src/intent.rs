//! crates/climatech_core/src/intent.rs
//!
//! Keyword-based intent detection. Keyword sets and their evaluation order are
//! plain data so the tie-break policy can be inspected and reordered.

use crate::ports::IntentClassifier;
use serde::{Deserialize, Serialize};

/// The classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    WeatherQuery,
    PhilippinesClimateInfo,
    ForecastQuery,
    Smalltalk,
}

/// Words that mark a message as a weather question needing the user's location.
pub const LOCATION_KEYWORDS: &[&str] =
    &["weather", "temperature", "rain", "forecast", "climate", "humid"];

/// One entry of the priority list: if any keyword occurs, the intent wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Case-insensitive substring classifier. The first matching rule wins;
/// nothing matching yields [`Intent::Smalltalk`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    location_keywords: Vec<String>,
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    pub fn new(location_keywords: &[&str], rules: Vec<KeywordRule>) -> Self {
        Self {
            location_keywords: location_keywords.iter().map(|k| k.to_lowercase()).collect(),
            rules,
        }
    }

    /// Keeps the location keywords but evaluates response rules in a new order.
    pub fn with_rules(mut self, rules: Vec<KeywordRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// The order used by the assistant: weather, then Philippines, then forecast.
    pub fn default_rules() -> Vec<KeywordRule> {
        vec![
            KeywordRule::new(Intent::WeatherQuery, &["weather"]),
            KeywordRule::new(Intent::PhilippinesClimateInfo, &["philippines"]),
            KeywordRule::new(Intent::ForecastQuery, &["forecast"]),
        ]
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(LOCATION_KEYWORDS, Self::default_rules())
    }
}

impl IntentClassifier for KeywordClassifier {
    fn needs_location(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.location_keywords
            .iter()
            .any(|k| lowered.contains(k.as_str()))
    }

    fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Smalltalk)
    }
}
