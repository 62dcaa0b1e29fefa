//! The HTTP surface of the relay
//!
//! Each request is a single linear pipeline: validate the input, fetch the range, locate the row of the requested date,
//! then either decode that row or send a batch of cell updates for it.

use std::error::Error;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::client::SheetsClient;
use crate::config::Config;
use crate::credentials::ServiceAccount;
use crate::error::RelayError;
use crate::grid::{find_row, DateKey, Grid};
use crate::task::{decode_row, TaskStates};
use crate::traits::SheetGateway;
use crate::update::plan_updates;

static MISSING_UPDATE_FIELDS: &str = "Missing required fields: spreadsheetId, range, tasks or date";
static MISSING_QUERY_PARAMETERS: &str = "Missing required query parameters: spreadsheetId or date";
static UPDATE_FAILED: &str = "Failed to update sheet";
static FETCH_FAILED: &str = "Failed to fetch sheet data";

/// What every request handler shares: the one gateway of the process, created at startup
pub struct AppState {
    gateway: Arc<dyn SheetGateway>,
    default_range: String,
}

impl AppState {
    pub fn new<S: ToString>(gateway: Arc<dyn SheetGateway>, default_range: S) -> Self {
        Self {
            gateway,
            default_range: default_range.to_string(),
        }
    }

    pub fn gateway(&self) -> &dyn SheetGateway { self.gateway.as_ref() }
    pub fn default_range(&self) -> &str { &self.default_range }
}

/// Body of `POST /update-sheet`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSheetRequest {
    pub spreadsheet_id: Option<String>,
    pub sheet_id: Option<i64>,
    pub range: Option<String>,
    pub date: Option<String>,
    pub tasks: Option<TaskStates>,
}

/// Query string of `GET /get-tasks-by-date`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub spreadsheet_id: Option<String>,
    pub range: Option<String>,
    pub date: Option<String>,
}

/// Empty strings count as missing
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| value.is_empty() == false)
}

/// Fetch `range` and return it, along with the index of the row that holds `date`
async fn locate_row(state: &AppState, spreadsheet_id: &str, range: &str, date: &str, context: &'static str) -> Result<(Grid, usize), RelayError> {
    let rows = state.gateway().fetch_range(spreadsheet_id, range).await
        .map_err(|err| {
            log::error!("{}: {}", context, err);
            RelayError::gateway(context, &err)
        })?;

    if rows.is_empty() {
        return Err(RelayError::EmptyData);
    }

    let row_index = DateKey::parse(date)
        .and_then(|target| find_row(&rows, &target))
        .ok_or_else(|| RelayError::NoMatchingRow(date.to_string()))?;
    log::debug!("Date {} is on row {} of {}", date, row_index, range);

    Ok((rows, row_index))
}

/// `POST /update-sheet`: write the completion flags of one day
pub async fn update_sheet(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateSheetRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::debug!("Rejected update request: {}", rejection);
            return Err(RelayError::Validation(MISSING_UPDATE_FIELDS));
        },
    };

    let (spreadsheet_id, range, date, tasks) = match (
        present(request.spreadsheet_id),
        present(request.range),
        present(request.date),
        request.tasks,
    ) {
        (Some(s), Some(r), Some(d), Some(t)) => (s, r, d, t),
        _ => return Err(RelayError::Validation(MISSING_UPDATE_FIELDS)),
    };
    let sheet_id = request.sheet_id.unwrap_or(0);

    let (rows, row_index) = locate_row(&state, &spreadsheet_id, &range, &date, UPDATE_FAILED).await?;
    let instructions = plan_updates(&rows[0], &tasks, row_index);
    log::info!("Updating {} tasks on row {} of sheet {} in {}", instructions.len(), row_index, sheet_id, spreadsheet_id);

    let ack = state.gateway().apply_batch(&spreadsheet_id, sheet_id, &instructions).await
        .map_err(|err| {
            log::error!("{}: {}", UPDATE_FAILED, err);
            RelayError::gateway(UPDATE_FAILED, &err)
        })?;

    Ok(Json(json!({
        "message": "Sheet updated successfully",
        "data": ack,
    })))
}

/// `GET /get-tasks-by-date`: read the completion flags of one day
pub async fn get_tasks_by_date(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TasksQuery>, QueryRejection>,
) -> Result<Json<TaskStates>, RelayError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            log::debug!("Rejected query: {}", rejection);
            return Err(RelayError::Validation(MISSING_QUERY_PARAMETERS));
        },
    };
    let (spreadsheet_id, date) = match (present(query.spreadsheet_id), present(query.date)) {
        (Some(s), Some(d)) => (s, d),
        _ => return Err(RelayError::Validation(MISSING_QUERY_PARAMETERS)),
    };
    let range = present(query.range).unwrap_or_else(|| state.default_range().to_string());

    let (rows, row_index) = locate_row(&state, &spreadsheet_id, &range, &date, FETCH_FAILED).await?;
    Ok(Json(decode_row(&rows[0], &rows[row_index])))
}


/// The routes of the relay, without any middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/update-sheet", post(update_sheet))
        .route("/get-tasks-by-date", get(get_tasks_by_date))
        .with_state(state)
}

/// Let browsers on `origins` call the relay, with credentials
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, Box<dyn Error + Send + Sync>> {
    let origins = origins.iter()
        .map(|origin| HeaderValue::from_str(origin).map_err(|err| format!("Invalid CORS origin {:?}: {}", origin, err)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutting down"),
        Err(err) => {
            log::warn!("Unable to listen for Ctrl-C ({}). The server will only stop when killed", err);
            std::future::pending::<()>().await
        },
    }
}

/// Connect the relay to Google Sheets with the service account of `config`, and serve it until Ctrl-C
pub async fn run(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let account = ServiceAccount::new(&config.client_email, &config.private_key, &config.token_uri)?;
    let client = SheetsClient::new(&config.sheets_api_base, account)?;
    log::debug!("Using service account {}", client.account().client_email());

    let state = Arc::new(AppState::new(Arc::new(client), &config.default_range));
    let app = router(state).layer(cors_layer(&config.cors_origins)?);

    let listener = TcpListener::bind(config.listen_address).await?;
    log::info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
