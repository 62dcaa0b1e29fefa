//! This module provides a client to connect to the Google Sheets API

use std::error::Error;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::credentials::ServiceAccount;
use crate::grid::Grid;
use crate::traits::SheetGateway;
use crate::update::{BatchUpdate, UpdateInstruction};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Turn a cell as serialised by the API into the text a user sees in the sheet
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Build an error from a non-successful reply, preferably with the message the API put in it
async fn error_from_response(response: reqwest::Response) -> Box<dyn Error + Send + Sync> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error.message.into(),
        Err(_) => format!("Unexpected HTTP status code {}", status).into(),
    }
}


/// A [`SheetGateway`] backed by the Google Sheets v4 REST API.
///
/// It holds a single connection pool and a single [`ServiceAccount`], so that it should be created once and shared.
pub struct SheetsClient {
    base_url: Url,
    account: ServiceAccount,
    http: reqwest::Client,
}

impl SheetsClient {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S, account: ServiceAccount) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }

        Ok(Self {
            base_url,
            account,
            http: reqwest::Client::new(),
        })
    }

    pub fn account(&self) -> &ServiceAccount { &self.account }

    /// Build `{base}/v4/spreadsheets/<segments...>`, each segment being percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // This cannot fail, since `new` rejected the URLs that cannot be a base
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().push("v4").push("spreadsheets").extend(segments);
            }
        }
        url
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Url {
        self.endpoint(&[spreadsheet_id, "values", range])
    }

    fn batch_update_url(&self, spreadsheet_id: &str) -> Url {
        let segment = format!("{}:batchUpdate", spreadsheet_id);
        self.endpoint(&[segment.as_str()])
    }
}

#[async_trait]
impl SheetGateway for SheetsClient {
    async fn fetch_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid, Box<dyn Error + Send + Sync>> {
        let token = self.account.access_token(&self.http).await?;
        let url = self.values_url(spreadsheet_id, range);
        log::debug!("Fetching {}", url);

        let response = self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(error_from_response(response).await);
        }

        let value_range: ValueRange = response.json().await?;
        let grid = value_range.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(grid)
    }

    async fn apply_batch(&self, spreadsheet_id: &str, sheet_id: i64, instructions: &[UpdateInstruction]) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>> {
        let token = self.account.access_token(&self.http).await?;
        let url = self.batch_update_url(spreadsheet_id);
        log::debug!("Sending {} cell updates to {}", instructions.len(), url);

        let response = self.http
            .post(url)
            .bearer_auth(token)
            .json(&BatchUpdate::new(sheet_id, instructions))
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(error_from_response(response).await);
        }

        let ack = response.json().await?;
        Ok(ack)
    }
}
