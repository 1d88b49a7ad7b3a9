//! crates/climatech_core/src/engine.rs
//!
//! The session state engine. It owns one [`Session`] and drives the two
//! asynchronous flows, reply production and location consent, through the
//! ports. Each flow suspends without holding the session lock, so the
//! Idle/AwaitingResponse gate is what keeps them from overlapping.

use crate::domain::{
    ConsentState, Coordinates, Location, MapDisplayMode, Message, Notification, WeatherSnapshot,
};
use crate::notifications::NotificationLedger;
use crate::persistence::SessionPersistence;
use crate::ports::{
    GeolocationOutcome, GeolocationService, IntentClassifier, LocationResolver, MapSink,
    SessionStore, WeatherProvider,
};
use crate::session::{PendingReply, ResponsePhase, Session};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where the map starts before any location is known.
pub const PHILIPPINES_CENTER: Coordinates = Coordinates {
    lat: 12.8797,
    lng: 121.7740,
};
pub const OVERVIEW_ZOOM: u8 = 6;
pub const LOCATED_ZOOM: u8 = 12;

const EVENT_CAPACITY: usize = 64;

//=========================================================================================
// Errors, configuration and outcomes
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A response is already pending")]
    ResponsePending,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Session is shut down")]
    ShutDown,
}

/// The ports a session talks to.
#[derive(Clone)]
pub struct EngineServices {
    pub store: Arc<dyn SessionStore>,
    pub weather: Arc<dyn WeatherProvider>,
    pub resolver: Arc<dyn LocationResolver>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub map: Arc<dyn MapSink>,
}

/// Simulated thinking time before a bot reply is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTiming {
    pub reply_delay: Duration,
    pub prompt_delay: Duration,
}

impl Default for ResponseTiming {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1500),
            prompt_delay: Duration::from_millis(1000),
        }
    }
}

/// State changes pushed to whoever hosts the session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { message: Message },
    LogReplaced { messages: Vec<Message> },
    PhaseChanged { phase: ResponsePhase },
    ConsentChanged { consent: ConsentState },
    NotificationsChanged { unread: usize },
}

/// A user message that passed the gate and is waiting for its reply.
#[derive(Debug)]
pub struct AcceptedTurn {
    user: Message,
    pending: PendingReply,
}

impl AcceptedTurn {
    pub fn user(&self) -> &Message {
        &self.user
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Replied { user: Message, reply: Message },
    /// The session shut down before the reply was produced.
    Cancelled { user: Message },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsentOutcome {
    Unsupported,
    Denied,
    Granted {
        location: Location,
        weather: Option<WeatherSnapshot>,
    },
    Cancelled,
}

/// Everything a freshly attached client needs to render the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub messages: Vec<Message>,
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub consent: ConsentState,
    pub location: Option<Location>,
    pub phase: ResponsePhase,
    pub map_mode: MapDisplayMode,
}

//=========================================================================================
// The Engine
//=========================================================================================

pub struct SessionEngine {
    session: Mutex<Session>,
    services: EngineServices,
    persistence: SessionPersistence,
    timing: ResponseTiming,
    events: broadcast::Sender<SessionEvent>,
    shutdown: CancellationToken,
}

impl SessionEngine {
    /// Restores the persisted log (or seeds a fresh one) and puts the map in
    /// its overview position.
    pub async fn start(services: EngineServices, timing: ResponseTiming) -> Self {
        let now = Utc::now();
        let persistence = SessionPersistence::new(services.store.clone());
        let log = persistence.load(now).await;
        info!(messages = log.len(), "Session started.");

        services.map.set_center(PHILIPPINES_CENTER);
        services.map.set_zoom(OVERVIEW_ZOOM);
        services.map.set_display_mode(MapDisplayMode::default());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: Mutex::new(Session::new(log, NotificationLedger::seeded(now))),
            services,
            persistence,
            timing,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Cancels any in-flight turn or location request.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.shutdown.is_cancelled() {
            return Err(EngineError::ShutDown);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the session works headless.
        let _ = self.events.send(event);
    }

    async fn abandon_pending(&self) {
        self.session.lock().await.abandon_pending();
        self.emit(SessionEvent::PhaseChanged {
            phase: ResponsePhase::Idle,
        });
    }

    //=====================================================================================
    // Reply production
    //=====================================================================================

    /// Runs one user turn: append the message, wait, then append the reply.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome, EngineError> {
        let turn = self.accept(text).await?;
        Ok(self.complete(turn).await)
    }

    /// First half of [`submit`](Self::submit): takes the Idle/AwaitingResponse
    /// gate and appends the user message. Callers that must keep submission
    /// order await this inline and run [`complete`](Self::complete) elsewhere.
    pub async fn accept(&self, text: &str) -> Result<AcceptedTurn, EngineError> {
        let (user, pending) = {
            let mut session = self.session.lock().await;
            self.ensure_running()?;
            let (user, pending) =
                session.begin_turn(text, self.services.classifier.as_ref(), Utc::now())?;
            self.persistence.write(session.log()).await;
            (user, pending)
        };
        self.emit(SessionEvent::MessageAppended {
            message: user.clone(),
        });
        self.emit(SessionEvent::PhaseChanged {
            phase: ResponsePhase::AwaitingResponse,
        });
        Ok(AcceptedTurn { user, pending })
    }

    /// Waits out the reply delay and appends the reply for an accepted turn.
    pub async fn complete(&self, turn: AcceptedTurn) -> TurnOutcome {
        let AcceptedTurn { user, pending } = turn;
        let delay = match pending {
            PendingReply::LocationPrompt => self.timing.prompt_delay,
            PendingReply::Answer { .. } => self.timing.reply_delay,
        };
        tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!("Session shut down while a reply was pending.");
                self.abandon_pending().await;
                return TurnOutcome::Cancelled { user };
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let reply = {
            let mut session = self.session.lock().await;
            let reply =
                session.complete_turn(pending, self.services.classifier.as_ref(), Utc::now());
            self.persistence.write(session.log()).await;
            reply
        };
        self.emit(SessionEvent::MessageAppended {
            message: reply.clone(),
        });
        self.emit(SessionEvent::PhaseChanged {
            phase: ResponsePhase::Idle,
        });
        TurnOutcome::Replied { user, reply }
    }

    //=====================================================================================
    // Location consent
    //=====================================================================================

    /// Asks the platform for the user's position and reports the result in
    /// the conversation.
    pub async fn request_location(
        &self,
        geolocation: &dyn GeolocationService,
    ) -> Result<ConsentOutcome, EngineError> {
        self.ensure_running()?;
        if !geolocation.is_supported() {
            warn!("Geolocation is not available on this client.");
            let message = {
                let mut session = self.session.lock().await;
                let message = session.record_unsupported(Utc::now());
                self.persistence.write(session.log()).await;
                message
            };
            self.emit(SessionEvent::MessageAppended { message });
            return Ok(ConsentOutcome::Unsupported);
        }

        {
            let mut session = self.session.lock().await;
            self.ensure_running()?;
            session.begin_location_request()?;
        }
        self.emit(SessionEvent::PhaseChanged {
            phase: ResponsePhase::AwaitingResponse,
        });

        let outcome = tokio::select! {
            _ = self.shutdown.cancelled() => {
                self.abandon_pending().await;
                return Ok(ConsentOutcome::Cancelled);
            }
            outcome = geolocation.current_position() => outcome,
        };

        match outcome {
            GeolocationOutcome::Denied => {
                info!("Location access denied.");
                let (message, consent) = {
                    let mut session = self.session.lock().await;
                    let message = session.deny_location(Utc::now());
                    self.persistence.write(session.log()).await;
                    (message, session.consent())
                };
                self.emit_resolution(message, consent);
                Ok(ConsentOutcome::Denied)
            }
            GeolocationOutcome::Granted(coords) => {
                let location = Location::new(coords, self.services.resolver.resolve(coords));
                info!(place = %location.name, "Location access granted.");

                let weather = tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        self.abandon_pending().await;
                        return Ok(ConsentOutcome::Cancelled);
                    }
                    result = self.services.weather.fetch_weather(&location) => match result {
                        Ok(snapshot) => Some(snapshot),
                        Err(e) => {
                            warn!("Weather lookup failed for {}: {}", location.name, e);
                            None
                        }
                    },
                };

                let message = {
                    let mut session = self.session.lock().await;
                    let message =
                        session.grant_location(location.clone(), weather.clone(), Utc::now());
                    self.persistence.write(session.log()).await;
                    message
                };

                self.services.map.set_center(coords);
                self.services.map.set_zoom(LOCATED_ZOOM);
                self.services.map.place_marker(&location);

                self.emit_resolution(message, ConsentState::Granted);
                Ok(ConsentOutcome::Granted { location, weather })
            }
        }
    }

    fn emit_resolution(&self, message: Message, consent: ConsentState) {
        self.emit(SessionEvent::MessageAppended { message });
        self.emit(SessionEvent::ConsentChanged { consent });
        self.emit(SessionEvent::PhaseChanged {
            phase: ResponsePhase::Idle,
        });
    }

    //=====================================================================================
    // History
    //=====================================================================================

    pub async fn snapshot(&self) -> Vec<Message> {
        self.session.lock().await.log().snapshot().to_vec()
    }

    /// Replaces the log with `prefix`. An empty prefix is ignored.
    pub async fn load_branch(&self, prefix: Vec<Message>) -> Result<bool, EngineError> {
        let mut session = self.session.lock().await;
        let replaced = session.load_branch(prefix)?;
        self.after_branch(&session, replaced).await;
        Ok(replaced)
    }

    /// Rewinds the log to end at `message_id`. Unknown ids are ignored.
    pub async fn branch_through(&self, message_id: &str) -> Result<bool, EngineError> {
        let mut session = self.session.lock().await;
        let replaced = session.branch_through(message_id)?;
        self.after_branch(&session, replaced).await;
        Ok(replaced)
    }

    async fn after_branch(&self, session: &Session, replaced: bool) {
        if !replaced {
            return;
        }
        self.persistence.write(session.log()).await;
        info!(messages = session.log().len(), "Conversation rewound.");
        self.emit(SessionEvent::LogReplaced {
            messages: session.log().snapshot().to_vec(),
        });
    }

    //=====================================================================================
    // Notifications
    //=====================================================================================

    pub async fn mark_read(&self, id: &str) -> bool {
        let (changed, unread) = {
            let mut session = self.session.lock().await;
            let changed = session.notifications_mut().mark_read(id);
            (changed, session.notifications().unread_count())
        };
        if changed {
            self.emit(SessionEvent::NotificationsChanged { unread });
        }
        changed
    }

    pub async fn push_notification(&self, notification: Notification) -> bool {
        let (added, unread) = {
            let mut session = self.session.lock().await;
            let added = session.notifications_mut().push(notification);
            (added, session.notifications().unread_count())
        };
        if added {
            self.emit(SessionEvent::NotificationsChanged { unread });
        }
        added
    }

    pub async fn unread_count(&self) -> usize {
        self.session.lock().await.notifications().unread_count()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.session.lock().await.notifications().entries().to_vec()
    }

    //=====================================================================================
    // Map and read-only accessors
    //=====================================================================================

    pub async fn set_map_mode(&self, mode: MapDisplayMode) {
        self.session.lock().await.set_map_mode(mode);
        self.services.map.set_display_mode(mode);
    }

    pub async fn consent(&self) -> ConsentState {
        self.session.lock().await.consent()
    }

    pub async fn current_location(&self) -> Option<Location> {
        self.session.lock().await.location().cloned()
    }

    pub async fn latest_weather(&self) -> Option<WeatherSnapshot> {
        self.session.lock().await.weather().cloned()
    }

    pub async fn phase(&self) -> ResponsePhase {
        self.session.lock().await.phase()
    }

    pub async fn overview(&self) -> SessionOverview {
        let session = self.session.lock().await;
        SessionOverview {
            messages: session.log().snapshot().to_vec(),
            notifications: session.notifications().entries().to_vec(),
            unread_count: session.notifications().unread_count(),
            consent: session.consent(),
            location: session.location().cloned(),
            phase: session.phase(),
            map_mode: session.map_mode(),
        }
    }
}
