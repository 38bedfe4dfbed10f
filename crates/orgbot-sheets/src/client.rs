//! Feishu sheets HTTP client (reqwest-based).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cell::{cell_i64, cell_text};
use crate::error::SheetsError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// One purchase record pulled from the order spreadsheet.
///
/// Column layout: order id, username, email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
struct TenantTokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TenantTokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: String,
}

#[derive(Debug, Deserialize)]
struct SheetQueryResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<SheetQueryData>,
}

#[derive(Debug, Deserialize)]
struct SheetQueryData {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    sheet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    data: Option<RangeData>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(rename = "valueRange")]
    value_range: Option<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Client for one Feishu spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    spreadsheet_token: String,
}

impl SheetsClient {
    /// Create a new client for the given spreadsheet.
    ///
    /// `base_url` defaults to the public Feishu endpoint when `None`;
    /// injectable for tests.
    pub fn new(
        app_id: String,
        app_secret: String,
        spreadsheet_token: String,
        base_url: Option<String>,
    ) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent("orgbot/0.1")
            .build()
            .map_err(|e| SheetsError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url
            .unwrap_or_else(|| "https://open.feishu.cn".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            app_id,
            app_secret,
            spreadsheet_token,
        })
    }

    /// Acquire a tenant access token for subsequent calls.
    async fn tenant_access_token(&self) -> Result<String, SheetsError> {
        let url = format!(
            "{}/open-apis/auth/v3/tenant_access_token/internal",
            self.base_url
        );
        let response: TenantTokenResponse = self
            .http
            .post(&url)
            .json(&TenantTokenRequest {
                app_id: &self.app_id,
                app_secret: &self.app_secret,
            })
            .send()
            .await?
            .json()
            .await?;

        if response.code != 0 {
            return Err(SheetsError::Api {
                code: response.code,
                message: response.msg,
            });
        }
        Ok(response.tenant_access_token)
    }

    /// Discover the id of the first sheet in the spreadsheet.
    async fn first_sheet_id(&self, token: &str) -> Result<String, SheetsError> {
        let url = format!(
            "{}/open-apis/sheets/v3/spreadsheets/{}/sheets/query",
            self.base_url, self.spreadsheet_token
        );
        let response: SheetQueryResponse = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;

        if response.code != 0 {
            return Err(SheetsError::Api {
                code: response.code,
                message: response.msg,
            });
        }

        response
            .data
            .and_then(|d| d.sheets.into_iter().next())
            .and_then(|s| s.sheet_id)
            .ok_or(SheetsError::NoSheets)
    }

    /// Fetch the raw cell values for a `start:end` range of the first sheet.
    pub async fn range_values(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Vec<Value>>, SheetsError> {
        let token = self.tenant_access_token().await?;
        let sheet_id = self.first_sheet_id(&token).await?;

        let url = format!(
            "{}/open-apis/sheets/v2/spreadsheets/{}/values/{}!{}:{}",
            self.base_url, self.spreadsheet_token, sheet_id, start, end
        );
        let response: RangeResponse = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?
            .json()
            .await?;

        let values = response
            .data
            .and_then(|d| d.value_range)
            .map(|v| v.values)
            .ok_or_else(|| {
                SheetsError::MalformedResponse("missing data.valueRange.values".to_string())
            })?;

        debug!(rows = values.len(), start, end, "fetched sheet range");
        Ok(values)
    }

    /// Fetch a range and convert it into order rows.
    ///
    /// Rows without a parsable order id or with an empty username and
    /// email are skipped with a warning rather than failing the batch.
    pub async fn fetch_rows(&self, start: &str, end: &str) -> Result<Vec<OrderRow>, SheetsError> {
        let values = self.range_values(start, end).await?;
        Ok(rows_from_values(&values))
    }
}

/// Convert raw range values into order rows, skipping unusable ones.
pub fn rows_from_values(values: &[Vec<Value>]) -> Vec<OrderRow> {
    let mut rows = Vec::with_capacity(values.len());
    for (idx, cells) in values.iter().enumerate() {
        let order_id = cells.first().and_then(cell_i64);
        let username = cells.get(1).map(cell_text).unwrap_or_default();
        let email = cells.get(2).map(cell_text).unwrap_or_default();

        let Some(order_id) = order_id else {
            warn!(row = idx, "skipping row without a parsable order id");
            continue;
        };
        if username.is_empty() && email.is_empty() {
            warn!(row = idx, order_id, "skipping row without any identity");
            continue;
        }

        rows.push(OrderRow {
            order_id,
            username,
            email,
        });
    }
    rows
}
