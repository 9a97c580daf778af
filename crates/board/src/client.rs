//! Board API HTTP client.
//!
//! Blocking reqwest client (no async runtime required). One client per
//! run, constructed explicitly with its token — there is no process-wide
//! singleton to poison.

use std::time::Duration;

use serde_json::Value;

use crate::gql::{self, GqlRequest};
use crate::types::{Board, BoardKind, Column, ColumnType, Item};

const DEFAULT_API_BASE: &str = "https://api.monday.com/v2";
const USER_AGENT: &str = concat!("formsync/", env!("CARGO_PKG_VERSION"));

/// Items fetched per page. The remote caps item pages at 500.
pub const PAGE_LIMIT: u32 = 500;

/// Error type for board API operations.
///
/// Connectivity and auth failures are fatal for a run; everything else is
/// contained by the caller (the reconciler records a failed entity and
/// moves on).
#[derive(Debug)]
pub enum ApiError {
    /// Token rejected by the remote (401/403).
    Auth(u16, String),
    /// Network error (DNS, TLS, timeout).
    Network(String),
    /// Non-success HTTP status outside the auth range.
    Http(u16, String),
    /// Rate limited (429). The client does not retry; pacing is the
    /// caller's job.
    RateLimited(String),
    /// Response body was not the JSON shape expected.
    Parse(String),
    /// HTTP 200 with GraphQL-level errors in the payload.
    GraphQl(Vec<String>),
    /// Rejected client-side before any request was sent.
    InvalidRequest(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(status, msg) => write!(f, "auth rejected ({status}): {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(status, msg) => write!(f, "HTTP {status}: {msg}"),
            Self::RateLimited(msg) => write!(f, "rate limited: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::GraphQl(msgs) => write!(f, "API error: {}", msgs.join("; ")),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Board API client (blocking).
#[derive(Clone)]
pub struct BoardClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl BoardClient {
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(token: String, api_base: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self { http, api_base, token }
    }

    /// POST one operation and return the full response body. GraphQL-level
    /// errors surface as `ApiError::GraphQl` even on HTTP 200.
    pub fn execute(&self, request: &GqlRequest) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(&self.api_base)
            .header("Authorization", &self.token)
            .json(request)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| ApiError::Network(e.to_string()))?;

        if status == 401 || status == 403 {
            return Err(ApiError::Auth(status, truncate(&text)));
        }
        if status == 429 {
            return Err(ApiError::RateLimited(truncate(&text)));
        }
        if !(200..300).contains(&status) {
            return Err(ApiError::Http(status, truncate(&text)));
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Parse(format!("{e} (body: {})", truncate(&text))))?;

        if let Some(errors) = body["errors"].as_array() {
            if !errors.is_empty() {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e["message"]
                            .as_str()
                            .map(String::from)
                            .unwrap_or_else(|| e.to_string())
                    })
                    .collect();
                return Err(ApiError::GraphQl(messages));
            }
        }

        Ok(body)
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// All boards visible to the token (id + name only).
    pub fn list_boards(&self, limit: u32) -> Result<Vec<(String, String)>, ApiError> {
        let body = self.execute(&gql::list_boards(limit))?;
        let boards = body["data"]["boards"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|b| Some((json_id(&b["id"])?, b["name"].as_str()?.to_string())))
            .collect();
        Ok(boards)
    }

    /// Name, column schema, and item count of one board.
    pub fn board_overview(&self, board_id: &str) -> Result<Board, ApiError> {
        let body = self.execute(&gql::board_overview(board_id))?;
        let board = body["data"]["boards"]
            .as_array()
            .and_then(|b| b.first())
            .ok_or_else(|| ApiError::Parse(format!("board {board_id} not in response")))?;

        let columns = board["columns"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(parse_column)
            .collect();

        Ok(Board {
            id: json_id(&board["id"]).unwrap_or_else(|| board_id.to_string()),
            name: board["name"].as_str().unwrap_or_default().to_string(),
            columns,
            items_count: board["items_count"].as_u64(),
        })
    }

    /// Full item list of a board via cursor pagination, optionally with
    /// one relation column's current linked ids.
    ///
    /// A missing or null item list is zero items, not an error — callers
    /// downstream report zero matches instead of crashing.
    pub fn fetch_items(
        &self,
        board_id: &str,
        relation_column: Option<&str>,
    ) -> Result<Vec<Item>, ApiError> {
        let mut all = Vec::new();

        let body = self.execute(&gql::items_page(board_id, PAGE_LIMIT, relation_column))?;
        let first = &body["data"]["boards"][0]["items_page"];
        all.extend(parse_items(first));
        let mut cursor = first["cursor"].as_str().map(String::from);

        while let Some(cur) = cursor {
            let body = self.execute(&gql::next_items_page(&cur, PAGE_LIMIT, relation_column))?;
            let page = &body["data"]["next_items_page"];
            all.extend(parse_items(page));

            let next = page["cursor"].as_str().map(String::from);
            // Repeated cursor would loop forever.
            if next.as_deref() == Some(cur.as_str()) {
                return Err(ApiError::Parse(format!("pagination stuck: cursor {cur} repeated")));
            }
            cursor = next;
        }

        Ok(all)
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Create a board; returns its id.
    pub fn create_board(
        &self,
        name: &str,
        kind: BoardKind,
        description: Option<&str>,
    ) -> Result<String, ApiError> {
        let body = self.execute(&gql::create_board(name, kind, description))?;
        json_id(&body["data"]["create_board"]["id"])
            .ok_or_else(|| ApiError::Parse("missing id in create_board response".into()))
    }

    /// Add a column to a board; returns the created column.
    pub fn create_column(
        &self,
        board_id: &str,
        title: &str,
        column_type: &ColumnType,
        defaults: Option<&Value>,
    ) -> Result<Column, ApiError> {
        let request = gql::create_column(board_id, title, column_type, defaults)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let body = self.execute(&request)?;
        parse_column(&body["data"]["create_column"])
            .ok_or_else(|| ApiError::Parse("missing column in create_column response".into()))
    }

    /// Create an item; returns its id.
    pub fn create_item(
        &self,
        board_id: &str,
        name: &str,
        column_values: &Value,
    ) -> Result<String, ApiError> {
        let body = self.execute(&gql::create_item(board_id, name, column_values))?;
        json_id(&body["data"]["create_item"]["id"])
            .ok_or_else(|| ApiError::Parse("missing id in create_item response".into()))
    }

    /// Overwrite a relation column with `target_ids`.
    pub fn set_relation(
        &self,
        board_id: &str,
        item_id: &str,
        column_id: &str,
        target_ids: &[String],
    ) -> Result<(), ApiError> {
        let body = self.execute(&gql::set_relation(board_id, item_id, column_id, target_ids))?;
        if body["data"]["change_multiple_column_values"]["id"].is_null() {
            return Err(ApiError::Parse("update not acknowledged".into()));
        }
        Ok(())
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

/// Remote ids arrive as numbers or strings depending on the field.
fn json_id(value: &Value) -> Option<String> {
    value
        .as_i64()
        .map(|n| n.to_string())
        .or_else(|| value.as_str().map(String::from))
}

fn parse_column(value: &Value) -> Option<Column> {
    Some(Column {
        id: json_id(&value["id"])?,
        title: value["title"].as_str().unwrap_or_default().to_string(),
        column_type: ColumnType::from_api_str(value["type"].as_str().unwrap_or_default()),
    })
}

fn parse_items(page: &Value) -> Vec<Item> {
    page["items"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|item| {
            let id = json_id(&item["id"])?;
            let name = item["name"].as_str().unwrap_or_default().to_string();
            let linked_ids = item["column_values"]
                .as_array()
                .map(|cols| {
                    cols.iter()
                        .flat_map(|cv| {
                            cv["linked_item_ids"].as_array().cloned().unwrap_or_default()
                        })
                        .filter_map(|v| json_id(&v))
                        .collect()
                })
                .unwrap_or_default();
            Some(Item { id, name, linked_ids })
        })
        .collect()
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}

// ── Tests ───────────────────────────────────────────────────────────
