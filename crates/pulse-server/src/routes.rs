//! HTTP route handlers: addition endpoint and contact submission.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pulse_store::NewContact;

use crate::error::ApiError;
use crate::metrics::{ADD_REQUESTS_TOTAL, CONTACT_SUBMISSIONS_TOTAL};
use crate::server::AppState;

/// Body returned on a successful contact submission.
pub const CONTACT_SUCCESS_MESSAGE: &str = "Hurray!!! your Email and message saved successfully";

/// Query parameters for the addition endpoint.
///
/// Operands arrive as raw strings so that missing and malformed values
/// can be told apart in the error message.
#[derive(Debug, Deserialize)]
pub struct AddParams {
    /// First operand.
    pub n1: Option<String>,
    /// Second operand.
    pub n2: Option<String>,
}

/// Response body for a successful addition.
#[derive(Debug, Serialize)]
pub struct AddResponse {
    /// The sum of the two operands.
    pub data: i64,
}

/// Response body for a successful contact submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    /// Human-readable confirmation message.
    pub message: String,
}

/// Parse one addition operand, rejecting anything that is not an integer.
fn parse_operand(raw: Option<&str>, name: &str) -> Result<i64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest(format!("missing query parameter {name}")))?;
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("{name} is not an integer: {raw:?}")))
}

/// `GET /addTwoNumber` — add two integer query parameters.
pub async fn add_two_numbers(
    Query(params): Query<AddParams>,
) -> Result<Json<AddResponse>, ApiError> {
    let n1 = parse_operand(params.n1.as_deref(), "n1")?;
    let n2 = parse_operand(params.n2.as_deref(), "n2")?;

    let sum = n1
        .checked_add(n2)
        .ok_or_else(|| ApiError::BadRequest(format!("sum of {n1} and {n2} overflows")))?;

    counter!(ADD_REQUESTS_TOTAL).increment(1);
    debug!(n1, n2, sum, "addition served");
    Ok(Json(AddResponse { data: sum }))
}

/// `POST /contact` — persist a contact submission.
///
/// Fields are coerced to strings; absent or non-string fields become
/// empty. Only a body that is not valid JSON is rejected.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let contact = NewContact {
        name: field(&body, "name"),
        email: field(&body, "email"),
        message: field(&body, "message"),
    };

    let record = state.contacts.insert(contact)?;
    counter!(CONTACT_SUBMISSIONS_TOTAL).increment(1);
    info!(contact_id = %record.id, "contact saved");

    Ok(Json(ContactResponse {
        message: CONTACT_SUCCESS_MESSAGE.to_string(),
    }))
}

/// Extract a string field from the submission body, defaulting to empty.
fn field(body: &serde_json::Value, key: &str) -> String {
    body.get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}
