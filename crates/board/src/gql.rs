//! GraphQL operation builders.
//!
//! Every operation is text with `$variable` placeholders plus a JSON
//! variables map. Column values use the remote's `JSON!` scalar, which is
//! a JSON document carried as a string — it is produced here with a
//! single `serde_json::to_string`, so no hand escaping anywhere.

use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{BoardKind, ColumnType};

/// One POST body for the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GqlRequest {
    pub query: String,
    pub variables: Value,
}

impl GqlRequest {
    fn new(query: impl Into<String>, variables: Value) -> Self {
        Self { query: query.into(), variables }
    }
}

// ── Queries ─────────────────────────────────────────────────────────

pub fn list_boards(limit: u32) -> GqlRequest {
    GqlRequest::new(
        "query ($limit: Int!) { boards(limit: $limit) { id name } }",
        json!({ "limit": limit }),
    )
}

/// Board name, column schema, and item count for one board.
pub fn board_overview(board_id: &str) -> GqlRequest {
    GqlRequest::new(
        "query ($boardId: [ID!]) { boards(ids: $boardId) { \
           id name items_count columns { id title type } } }",
        json!({ "boardId": [board_id] }),
    )
}

fn item_selection(with_relation: bool) -> &'static str {
    if with_relation {
        "items { id name column_values(ids: $columnIds) { \
           id ... on BoardRelationValue { linked_item_ids } } }"
    } else {
        "items { id name }"
    }
}

/// First page of a board's items, optionally with one relation column's
/// current linked ids.
pub fn items_page(board_id: &str, limit: u32, relation_column: Option<&str>) -> GqlRequest {
    let selection = item_selection(relation_column.is_some());
    match relation_column {
        Some(col) => GqlRequest::new(
            format!(
                "query ($boardId: [ID!], $limit: Int!, $columnIds: [String!]) {{ \
                   boards(ids: $boardId) {{ items_page(limit: $limit) {{ \
                     cursor {selection} }} }} }}"
            ),
            json!({ "boardId": [board_id], "limit": limit, "columnIds": [col] }),
        ),
        None => GqlRequest::new(
            format!(
                "query ($boardId: [ID!], $limit: Int!) {{ \
                   boards(ids: $boardId) {{ items_page(limit: $limit) {{ \
                     cursor {selection} }} }} }}"
            ),
            json!({ "boardId": [board_id], "limit": limit }),
        ),
    }
}

/// Subsequent pages, addressed by the cursor the previous page returned.
pub fn next_items_page(cursor: &str, limit: u32, relation_column: Option<&str>) -> GqlRequest {
    let selection = item_selection(relation_column.is_some());
    match relation_column {
        Some(col) => GqlRequest::new(
            format!(
                "query ($cursor: String!, $limit: Int!, $columnIds: [String!]) {{ \
                   next_items_page(cursor: $cursor, limit: $limit) {{ \
                     cursor {selection} }} }}"
            ),
            json!({ "cursor": cursor, "limit": limit, "columnIds": [col] }),
        ),
        None => GqlRequest::new(
            format!(
                "query ($cursor: String!, $limit: Int!) {{ \
                   next_items_page(cursor: $cursor, limit: $limit) {{ \
                     cursor {selection} }} }}"
            ),
            json!({ "cursor": cursor, "limit": limit }),
        ),
    }
}

// ── Mutations ───────────────────────────────────────────────────────

pub fn create_board(name: &str, kind: BoardKind, description: Option<&str>) -> GqlRequest {
    // board_kind is a GraphQL enum literal, not a string — it is the one
    // argument that cannot be passed as a quoted variable.
    GqlRequest::new(
        format!(
            "mutation ($name: String!, $description: String) {{ \
               create_board(board_name: $name, board_kind: {}, description: $description) {{ \
                 id name }} }}",
            kind.as_graphql()
        ),
        json!({ "name": name, "description": description }),
    )
}

/// Rejected before any request is built: `column_type` is embedded in
/// the mutation as a GraphQL enum literal, so only the closed vocabulary
/// may reach the operation text.
#[derive(Debug)]
pub struct UnsupportedColumnType(pub String);

impl std::fmt::Display for UnsupportedColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported column type '{}'", self.0)
    }
}

impl std::error::Error for UnsupportedColumnType {}

/// Add a column. `defaults` carries type-specific settings (for a
/// relation column: the allowed target board ids; for a mirror column:
/// the relation column and mirrored column ids).
pub fn create_column(
    board_id: &str,
    title: &str,
    column_type: &ColumnType,
    defaults: Option<&Value>,
) -> Result<GqlRequest, UnsupportedColumnType> {
    let literal = match column_type {
        ColumnType::Other(name) => return Err(UnsupportedColumnType(name.clone())),
        known => known.as_api_str(),
    };
    let defaults_str = defaults.map(|d| d.to_string());
    Ok(GqlRequest::new(
        format!(
            "mutation ($boardId: ID!, $title: String!, $defaults: JSON) {{ \
               create_column(board_id: $boardId, title: $title, \
                 column_type: {literal}, defaults: $defaults) {{ id title type }} }}"
        ),
        json!({ "boardId": board_id, "title": title, "defaults": defaults_str }),
    ))
}

/// Relation-column defaults: the fixed set of boards its links may target.
pub fn relation_defaults(target_board_ids: &[String]) -> Value {
    json!({ "boardIds": target_board_ids })
}

/// Mirror-column defaults: project `mirror_column` through `relation_column`.
pub fn mirror_defaults(relation_column: &str, mirror_column: &str) -> Value {
    json!({ "relation_column": { relation_column: true }, "displayed_column": { mirror_column: true } })
}

pub fn create_item(board_id: &str, name: &str, column_values: &Value) -> GqlRequest {
    GqlRequest::new(
        "mutation ($boardId: ID!, $name: String!, $columnValues: JSON) { \
           create_item(board_id: $boardId, item_name: $name, column_values: $columnValues) { \
             id name } }",
        json!({
            "boardId": board_id,
            "name": name,
            "columnValues": column_values.to_string(),
        }),
    )
}

/// Point a relation column at `target_ids`, overwriting its current value.
pub fn set_relation(
    board_id: &str,
    item_id: &str,
    column_id: &str,
    target_ids: &[String],
) -> GqlRequest {
    let column_values = json!({ column_id: { "item_ids": target_ids } });
    GqlRequest::new(
        "mutation ($boardId: ID!, $itemId: ID!, $columnValues: JSON!) { \
           change_multiple_column_values(board_id: $boardId, item_id: $itemId, \
             column_values: $columnValues) { id } }",
        json!({
            "boardId": board_id,
            "itemId": item_id,
            "columnValues": column_values.to_string(),
        }),
    )
}
