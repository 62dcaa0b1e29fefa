//! Ways a relayed request can fail, and how each of them is reported over HTTP

use std::error::Error;
use std::fmt::{Display, Formatter};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Every request ends either with a success, or with exactly one of these
#[derive(Debug)]
pub enum RelayError {
    /// A required field is missing. The message lists what was expected
    Validation(&'static str),
    /// The fetched range has no rows at all
    EmptyData,
    /// No row matches the requested date (kept verbatim, as sent by the caller)
    NoMatchingRow(String),
    /// The spreadsheet service failed. `context` says what was being done, `details` is the service's message
    Gateway { context: &'static str, details: String },
}

impl RelayError {
    pub fn gateway<E: Display + ?Sized>(context: &'static str, err: &E) -> Self {
        RelayError::Gateway { context, details: err.to_string() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::EmptyData | RelayError::NoMatchingRow(_) => StatusCode::NOT_FOUND,
            RelayError::Gateway { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Validation(msg) => write!(f, "{}", msg),
            RelayError::EmptyData => write!(f, "No data found in the sheet"),
            RelayError::NoMatchingRow(date) => write!(f, "No data found for the date: {}", date),
            RelayError::Gateway { context, .. } => write!(f, "{}", context),
        }
    }
}

impl Error for RelayError {}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = match &self {
            RelayError::Gateway { context, details } => json!({ "error": context, "details": details }),
            other => json!({ "error": other.to_string() }),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
