pub mod protocol;
pub mod rest;
pub mod state;
pub mod turn_task;
pub mod ws_handler;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{feedback_handler, history_handler, report_handler, sign_out_handler};
pub use ws_handler::ws_handler;
