//! services/api/src/adapters/support.rs
//!
//! Implements the `SupportDesk` port by logging each submission and
//! acknowledging it. Nothing is stored.

use async_trait::async_trait;
use climatech_core::domain::{Feedback, IssueReport};
use climatech_core::ports::SupportDesk;
use tracing::info;

#[derive(Clone, Default)]
pub struct LoggingSupportDesk;

#[async_trait]
impl SupportDesk for LoggingSupportDesk {
    async fn send_feedback(&self, feedback: &Feedback) -> bool {
        info!(chars = feedback.text.chars().count(), "Feedback received.");
        true
    }

    async fn submit_report(&self, report: &IssueReport) -> bool {
        info!(category = %report.category, "Issue report received: {}", report.description);
        true
    }

    async fn sign_out(&self) -> bool {
        info!("User signed out.");
        true
    }
}
