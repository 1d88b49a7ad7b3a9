//! crates/climatech_core/src/session.rs
//!
//! The explicit session record: log, consent, last known location and weather,
//! notifications, map mode and the response gate. All transitions here are
//! synchronous; the engine wraps them with the awaited port calls.

use crate::conversation::ConversationLog;
use crate::domain::{
    ConsentState, Location, MapDisplayMode, Message, Role, WeatherSnapshot,
};
use crate::engine::EngineError;
use crate::intent::Intent;
use crate::notifications::NotificationLedger;
use crate::ports::IntentClassifier;
use crate::responses;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Whether a reply (or a location lookup) is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePhase {
    #[default]
    Idle,
    AwaitingResponse,
}

/// What the engine will append once the simulated delay elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReply {
    /// Ask the user to enable location instead of answering.
    LocationPrompt,
    /// Classify `text` and answer it.
    Answer { text: String },
}

#[derive(Debug)]
pub struct Session {
    log: ConversationLog,
    consent: ConsentState,
    location: Option<Location>,
    weather: Option<WeatherSnapshot>,
    notifications: NotificationLedger,
    phase: ResponsePhase,
    map_mode: MapDisplayMode,
}

impl Session {
    pub fn new(log: ConversationLog, notifications: NotificationLedger) -> Self {
        Self {
            log,
            consent: ConsentState::Unrequested,
            location: None,
            weather: None,
            notifications,
            phase: ResponsePhase::Idle,
            map_mode: MapDisplayMode::default(),
        }
    }

    //=====================================================================================
    // Turn lifecycle: Idle -> AwaitingResponse -> Idle
    //=====================================================================================

    /// Accepts a user submission: appends it and closes the gate until the
    /// reply lands. Blank input and overlapping submissions are rejected
    /// without touching any state.
    pub fn begin_turn(
        &mut self,
        text: &str,
        classifier: &dyn IntentClassifier,
        now: DateTime<Utc>,
    ) -> Result<(Message, PendingReply), EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        self.ensure_idle()?;

        let user = self.log.append_new(Role::User, text, None, now);
        self.phase = ResponsePhase::AwaitingResponse;

        let pending = if classifier.needs_location(text)
            && self.location.is_none()
            && self.consent == ConsentState::Unrequested
        {
            info!("Weather question without a location; prompting for consent.");
            PendingReply::LocationPrompt
        } else {
            PendingReply::Answer {
                text: text.to_string(),
            }
        };
        Ok((user, pending))
    }

    /// Appends the reply for a pending turn and reopens the gate.
    pub fn complete_turn(
        &mut self,
        pending: PendingReply,
        classifier: &dyn IntentClassifier,
        now: DateTime<Utc>,
    ) -> Message {
        let body = match pending {
            PendingReply::LocationPrompt => responses::LOCATION_PROMPT.to_string(),
            PendingReply::Answer { text } => {
                let intent = classifier.classify(&text);
                debug!(?intent, "Classified user message");
                self.reply_for(intent)
            }
        };
        let reply = self.log.append_new(Role::Bot, body, None, now);
        self.phase = ResponsePhase::Idle;
        reply
    }

    fn reply_for(&self, intent: Intent) -> String {
        responses::reply_for(intent, self.location.as_ref(), self.weather.as_ref())
    }

    /// Reopens the gate without appending anything.
    pub fn abandon_pending(&mut self) {
        self.phase = ResponsePhase::Idle;
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match self.phase {
            ResponsePhase::Idle => Ok(()),
            ResponsePhase::AwaitingResponse => Err(EngineError::ResponsePending),
        }
    }

    //=====================================================================================
    // Consent transitions
    //=====================================================================================

    /// Reports missing platform support. Consent is left as it was.
    pub fn record_unsupported(&mut self, now: DateTime<Utc>) -> Message {
        self.log
            .append_new(Role::Bot, responses::GEOLOCATION_UNSUPPORTED, None, now)
    }

    pub fn begin_location_request(&mut self) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.phase = ResponsePhase::AwaitingResponse;
        Ok(())
    }

    /// Records a successful grant. Repeat grants overwrite the location and
    /// weather and append a fresh summary; consent simply stays `Granted`.
    pub fn grant_location(
        &mut self,
        location: Location,
        weather: Option<WeatherSnapshot>,
        now: DateTime<Utc>,
    ) -> Message {
        let body = match &weather {
            Some(snapshot) => responses::location_granted(&location, snapshot),
            None => responses::location_without_weather(&location),
        };
        self.consent = ConsentState::Granted;
        self.location = Some(location.clone());
        self.weather = weather;
        self.phase = ResponsePhase::Idle;
        self.log.append_new(Role::Bot, body, Some(location), now)
    }

    /// Records a refusal. A session that already holds a grant keeps it.
    pub fn deny_location(&mut self, now: DateTime<Utc>) -> Message {
        if self.consent != ConsentState::Granted {
            self.consent = ConsentState::Denied;
        }
        self.phase = ResponsePhase::Idle;
        self.log
            .append_new(Role::Bot, responses::LOCATION_DENIED, None, now)
    }

    //=====================================================================================
    // History, notifications and map
    //=====================================================================================

    pub fn load_branch(&mut self, prefix: Vec<Message>) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        Ok(self.log.load_branch(prefix))
    }

    pub fn branch_through(&mut self, message_id: &str) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        match self.log.prefix_through(message_id) {
            Some(prefix) => Ok(self.log.load_branch(prefix)),
            None => Ok(false),
        }
    }

    pub fn set_map_mode(&mut self, mode: MapDisplayMode) {
        self.map_mode = mode;
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn notifications(&self) -> &NotificationLedger {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationLedger {
        &mut self.notifications
    }

    pub fn consent(&self) -> ConsentState {
        self.consent
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn phase(&self) -> ResponsePhase {
        self.phase
    }

    pub fn map_mode(&self) -> MapDisplayMode {
        self.map_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, WeatherCondition};
    use crate::intent::KeywordClassifier;

    fn session() -> Session {
        let now = Utc::now();
        Session::new(ConversationLog::seeded(now), NotificationLedger::seeded(now))
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 29,
            humidity_pct: 70,
            wind_kph: 9,
            visibility_km: 12,
            condition: WeatherCondition::Sunny,
            uv_index: 6,
            pressure_hpa: 1015,
        }
    }

    #[test]
    fn blank_submission_changes_nothing() {
        let mut session = session();
        let classifier = KeywordClassifier::default();
        let err = session.begin_turn("   \n", &classifier, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyMessage));
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.phase(), ResponsePhase::Idle);
    }

    #[test]
    fn gate_rejects_overlapping_turns() {
        let mut session = session();
        let classifier = KeywordClassifier::default();
        session.begin_turn("hello", &classifier, Utc::now()).unwrap();
        let err = session.begin_turn("again", &classifier, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::ResponsePending));
        assert_eq!(session.log().len(), 2);
        assert!(session.begin_location_request().is_err());
    }

    #[test]
    fn weather_question_before_consent_is_preempted() {
        let mut session = session();
        let classifier = KeywordClassifier::default();
        let (_, pending) = session
            .begin_turn("What's the weather today?", &classifier, Utc::now())
            .unwrap();
        assert_eq!(pending, PendingReply::LocationPrompt);
        let reply = session.complete_turn(pending, &classifier, Utc::now());
        assert_eq!(reply.body, responses::LOCATION_PROMPT);
        assert_eq!(session.phase(), ResponsePhase::Idle);
    }

    #[test]
    fn denied_consent_skips_the_prompt_and_answers_generically() {
        let mut session = session();
        let classifier = KeywordClassifier::default();
        session.begin_location_request().unwrap();
        session.deny_location(Utc::now());
        assert_eq!(session.consent(), ConsentState::Denied);

        let (_, pending) = session
            .begin_turn("weather please", &classifier, Utc::now())
            .unwrap();
        let reply = session.complete_turn(pending, &classifier, Utc::now());
        assert_eq!(reply.body, responses::WEATHER_DISCLAIMER);
    }

    #[test]
    fn repeat_grant_overwrites_location_and_appends_a_summary() {
        let mut session = session();
        let first = Location::new(Coordinates::new(8.95, 125.54), "Butuan City, Agusan del Norte");
        let second = Location::new(Coordinates::new(10.31, 123.89), "Cebu City, Cebu");

        session.grant_location(first, Some(weather()), Utc::now());
        let summary = session.grant_location(second.clone(), Some(weather()), Utc::now());

        assert_eq!(session.consent(), ConsentState::Granted);
        assert_eq!(session.location(), Some(&second));
        assert_eq!(summary.location, Some(second));
        assert_eq!(session.log().len(), 3);
    }

    #[test]
    fn refusal_after_grant_keeps_the_grant() {
        let mut session = session();
        let here = Location::new(Coordinates::new(8.95, 125.54), "Butuan City, Agusan del Norte");
        session.grant_location(here, Some(weather()), Utc::now());
        session.deny_location(Utc::now());
        assert_eq!(session.consent(), ConsentState::Granted);
        assert!(session.location().is_some());
    }

    #[test]
    fn branching_is_refused_while_awaiting() {
        let mut session = session();
        let classifier = KeywordClassifier::default();
        session.begin_turn("hello", &classifier, Utc::now()).unwrap();
        assert!(matches!(
            session.branch_through("1"),
            Err(EngineError::ResponsePending)
        ));
    }
}
