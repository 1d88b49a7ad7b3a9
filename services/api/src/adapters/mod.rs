pub mod db;
pub mod file_store;
pub mod geolocation;
pub mod map;
pub mod support;
pub mod weather;

pub use db::DbAdapter;
pub use file_store::FileSessionStore;
pub use geolocation::ReportedPosition;
pub use map::{ClientMapSink, MapCommand};
pub use support::LoggingSupportDesk;
pub use weather::SimulatedWeatherAdapter;
