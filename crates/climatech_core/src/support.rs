//! crates/climatech_core/src/support.rs
//!
//! Validation in front of the outbound feedback, report and sign-out actions.

use crate::domain::{Feedback, IssueReport, ReportCategory};
use crate::engine::EngineError;
use crate::ports::SupportDesk;
use tracing::info;

pub fn feedback(text: &str) -> Result<Feedback, EngineError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EngineError::InvalidInput("feedback text is required".to_string()));
    }
    Ok(Feedback {
        text: text.to_string(),
    })
}

/// A report needs a category and a non-blank description.
pub fn issue_report(
    category: Option<ReportCategory>,
    description: &str,
) -> Result<IssueReport, EngineError> {
    let category = category
        .ok_or_else(|| EngineError::InvalidInput("report category is required".to_string()))?;
    let description = description.trim();
    if description.is_empty() {
        return Err(EngineError::InvalidInput(
            "report description is required".to_string(),
        ));
    }
    Ok(IssueReport {
        category,
        description: description.to_string(),
    })
}

pub async fn send_feedback(desk: &dyn SupportDesk, text: &str) -> Result<bool, EngineError> {
    let feedback = feedback(text)?;
    Ok(desk.send_feedback(&feedback).await)
}

pub async fn submit_report(
    desk: &dyn SupportDesk,
    category: Option<ReportCategory>,
    description: &str,
) -> Result<bool, EngineError> {
    let report = issue_report(category, description)?;
    info!(category = %report.category, "Submitting issue report.");
    Ok(desk.submit_report(&report).await)
}

pub async fn sign_out(desk: &dyn SupportDesk) -> bool {
    desk.sign_out().await
}
