//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use climatech_core::persistence::{decode_snapshot, SESSION_KEY};
use climatech_core::{support, EngineError, Message, ReportCategory, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        history_handler,
        feedback_handler,
        report_handler,
        sign_out_handler,
    ),
    components(
        schemas(HistoryEntry, FeedbackRequest, ReportRequest, ReportCategoryParam, AckResponse)
    ),
    tags(
        (name = "ClimaTech API", description = "API endpoints for the weather assistant.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One persisted chat message.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct HistoryEntry {
    id: String,
    /// Either `user` or `bot`.
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
    location_name: Option<String>,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Bot => "bot",
        };
        Self {
            id: message.id.clone(),
            role: role.to_string(),
            content: message.body.clone(),
            timestamp: message.created_at,
            location_name: message.location.as_ref().map(|l| l.name.clone()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    text: String,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategoryParam {
    Technical,
    DataInaccuracy,
    UserInterface,
    Performance,
    Other,
}

impl From<ReportCategoryParam> for ReportCategory {
    fn from(param: ReportCategoryParam) -> Self {
        match param {
            ReportCategoryParam::Technical => ReportCategory::Technical,
            ReportCategoryParam::DataInaccuracy => ReportCategory::DataInaccuracy,
            ReportCategoryParam::UserInterface => ReportCategory::UserInterface,
            ReportCategoryParam::Performance => ReportCategory::Performance,
            ReportCategoryParam::Other => ReportCategory::Other,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRequest {
    category: Option<ReportCategoryParam>,
    #[serde(default)]
    description: String,
}

/// Whether the support desk accepted the submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    accepted: bool,
}

fn rejected(e: EngineError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Return the persisted conversation.
///
/// An absent or unreadable snapshot yields an empty list.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "The persisted conversation, oldest first", body = [HistoryEntry]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let raw = app_state.store.load(SESSION_KEY).await.map_err(|e| {
        error!("Failed to read session snapshot: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read history".to_string(),
        )
    })?;

    let entries: Vec<HistoryEntry> = raw
        .as_deref()
        .and_then(decode_snapshot)
        .map(|messages| messages.iter().map(HistoryEntry::from).collect())
        .unwrap_or_default();
    Ok(Json(entries))
}

/// Send free-text feedback.
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 202, description = "Feedback forwarded", body = AckResponse),
        (status = 400, description = "Feedback text was blank")
    )
)]
pub async fn feedback_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let accepted = support::send_feedback(app_state.support.as_ref(), &request.text)
        .await
        .map_err(rejected)?;
    Ok((StatusCode::ACCEPTED, Json(AckResponse { accepted })))
}

/// File an issue report.
#[utoipa::path(
    post,
    path = "/reports",
    request_body = ReportRequest,
    responses(
        (status = 202, description = "Report forwarded", body = AckResponse),
        (status = 400, description = "Missing category or blank description")
    )
)]
pub async fn report_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let accepted = support::submit_report(
        app_state.support.as_ref(),
        request.category.map(ReportCategory::from),
        &request.description,
    )
    .await
    .map_err(rejected)?;
    Ok((StatusCode::ACCEPTED, Json(AckResponse { accepted })))
}

/// Sign the user out.
#[utoipa::path(
    post,
    path = "/sign-out",
    responses(
        (status = 200, description = "Sign-out acknowledged", body = AckResponse)
    )
)]
pub async fn sign_out_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let accepted = support::sign_out(app_state.support.as_ref()).await;
    Json(AckResponse { accepted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use climatech_core::{Coordinates, Location};

    #[test]
    fn history_entries_flatten_the_location_name() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let place = Location::new(Coordinates::new(8.9495, 125.5406), "Butuan City");
        let message = Message::bot("42", "Here you go", at).with_location(place);

        let entry = HistoryEntry::from(&message);
        assert_eq!(
            entry,
            HistoryEntry {
                id: "42".to_string(),
                role: "bot".to_string(),
                content: "Here you go".to_string(),
                timestamp: at,
                location_name: Some("Butuan City".to_string()),
            }
        );
    }

    #[test]
    fn report_requests_accept_missing_categories() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"description":"map is blank"}"#).unwrap();
        assert!(request.category.is_none());

        let request: ReportRequest =
            serde_json::from_str(r#"{"category":"data_inaccuracy","description":"x"}"#).unwrap();
        assert_eq!(
            request.category.map(ReportCategory::from),
            Some(ReportCategory::DataInaccuracy)
        );
    }

    #[test]
    fn api_doc_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/history", "/feedback", "/reports", "/sign-out"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
