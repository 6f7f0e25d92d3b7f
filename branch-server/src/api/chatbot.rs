//! Chatbot query endpoint

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use tokio::time::Duration;

use crate::chatbot;
use crate::state::AppState;

/// Ceiling on a single query; an overrun query is abandoned, not cancelled
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /chatbot/query
///
/// Internal failures never surface raw: the client always gets a
/// natural-language apology alongside the error field.
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Query text is required",
        ));
    }

    let branch = req.branch.filter(|b| !b.trim().is_empty());
    let is_admin = req.role.as_deref() == Some("admin");
    if !is_admin && branch.is_none() {
        return Err(AppError::new(ErrorCode::BranchRequired));
    }

    let result = tokio::time::timeout(
        QUERY_TIMEOUT,
        chatbot::answer(&state, &req.query, branch.as_deref()),
    )
    .await;

    match result {
        Ok(Ok(answer)) => Ok((
            StatusCode::OK,
            Json(ChatResponse {
                response: answer.response,
                data: answer.data.unwrap_or(Value::Null),
                error: None,
            }),
        )),
        Ok(Err(err)) => {
            let app_err = AppError::from(err);
            tracing::error!(code = %app_err.code, "Chatbot query failed");
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(apology(app_err.message))))
        }
        Err(_) => {
            tracing::warn!("Chatbot query timed out after {QUERY_TIMEOUT:?}");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(apology("Query timed out".to_string())),
            ))
        }
    }
}

fn apology(error: String) -> ChatResponse {
    ChatResponse {
        response: "Sorry, I ran into a problem answering that. Please try again.".to_string(),
        data: Value::Null,
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apology_keeps_data_null_and_carries_error() {
        let resp = apology("Query timed out".into());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"], "Query timed out");
        assert!(json["response"].as_str().unwrap().starts_with("Sorry"));
    }
}
