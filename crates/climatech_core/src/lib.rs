pub mod conversation;
pub mod domain;
pub mod engine;
pub mod intent;
pub mod location;
pub mod notifications;
pub mod persistence;
pub mod ports;
pub mod responses;
pub mod session;
pub mod support;

#[cfg(test)]
mod testing;

pub use domain::{
    ConsentState, Coordinates, Feedback, IssueReport, Location, MapDisplayMode, Message,
    Notification, NotificationCategory, ReportCategory, Role, WeatherCondition, WeatherSnapshot,
};
pub use engine::{
    AcceptedTurn, ConsentOutcome, EngineError, EngineServices, ResponseTiming, SessionEngine,
    SessionEvent, SessionOverview, TurnOutcome,
};
pub use intent::{Intent, KeywordClassifier};
pub use location::ReferencePointResolver;
pub use ports::{
    GeolocationOutcome, GeolocationService, IntentClassifier, LocationResolver, MapSink,
    PortError, PortResult, SessionStore, SupportDesk, WeatherProvider,
};
pub use session::ResponsePhase;
