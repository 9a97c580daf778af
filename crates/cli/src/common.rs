//! Shared plumbing for formsync commands.
//!
//! Every subcommand reuses:
//! - `resolve_api_token` — flag > env > error
//! - `load_profile` — read + parse + validate the TOML profile
//! - `open_database` / `load_entities` — local extraction
//! - `snapshot_board` — fetch a board into a [`BoardCache`]
//! - error-to-exit-code mapping for the three library error types

use std::path::Path;

use formsync_board::{ApiError, BoardClient, Item};
use formsync_db::{self as db, DbError};
use formsync_recon::cache::CachedItem;
use formsync_recon::config::EntityKind;
use formsync_recon::{BoardCache, SourceEntity, SyncConfig, SyncError};

use crate::exit_codes::{self, api_exit_code};
use crate::CliError;

pub const TOKEN_ENV: &str = "FORMSYNC_API_TOKEN";

/// Flag value (clap already applied the env fallback) > error.
pub fn resolve_api_token(flag: Option<String>) -> Result<String, CliError> {
    match flag {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(CliError {
            code: exit_codes::EXIT_API_NO_TOKEN,
            message: format!("missing API token (use --api-token or set {TOKEN_ENV})"),
            hint: Some("generate a token in the board platform's developer settings".into()),
        }),
    }
}

pub fn build_client(token: Option<String>, api_base: Option<String>) -> Result<BoardClient, CliError> {
    let token = resolve_api_token(token)?;
    Ok(match api_base {
        Some(base) => BoardClient::with_api_base(token, base),
        None => BoardClient::new(token),
    })
}

pub fn load_profile(path: &Path) -> Result<SyncConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: exit_codes::EXIT_CONFIG_READ,
        message: format!("cannot read profile {}: {e}", path.display()),
        hint: Some("pass --config PATH or create formsync.toml".into()),
    })?;
    SyncConfig::from_toml(&text).map_err(config_error)
}

pub fn open_database(path: &Path) -> Result<db::Connection, CliError> {
    db::open(&path.display().to_string()).map_err(db_error)
}

/// Local entities for a link, in stable id order.
pub fn load_entities(conn: &db::Connection, kind: EntityKind) -> Result<Vec<SourceEntity>, CliError> {
    match kind {
        EntityKind::Formulas => {
            let formulas = db::load_formulas(conn).map_err(db_error)?;
            Ok(formulas
                .iter()
                .map(|f| {
                    let mut entity = SourceEntity::new(
                        f.id,
                        f.display_name(),
                        f.ingredients.iter().map(|u| u.name.clone()).collect(),
                    );
                    entity.attributes.insert("status".into(), f.status.clone());
                    entity
                })
                .collect())
        }
        EntityKind::Ingredients => {
            let ingredients = db::load_ingredients(conn).map_err(db_error)?;
            Ok(ingredients
                .iter()
                .map(|i| {
                    let inci: Vec<String> = i.inci_name.iter().cloned().collect();
                    let mut entity = SourceEntity::new(i.id, i.name.clone(), inci);
                    if let Some(category) = &i.category {
                        entity.attributes.insert("category".into(), category.clone());
                    }
                    entity
                })
                .collect())
        }
    }
}

/// Fetch a board's items (with one relation column's current links) into
/// a cache for matching.
pub fn snapshot_board(
    client: &BoardClient,
    board_id: &str,
    relation_column: Option<&str>,
) -> Result<BoardCache, CliError> {
    let items = client
        .fetch_items(board_id, relation_column)
        .map_err(api_error)?;
    Ok(cache_from_items(items))
}

pub fn cache_from_items(items: Vec<Item>) -> BoardCache {
    BoardCache::from_items(items.into_iter().map(|item| CachedItem {
        id: item.id,
        name: item.name,
        linked_ids: item.linked_ids,
    }))
}

/// Progress goes to stderr only when interactive and not silenced.
pub fn show_progress(quiet: bool) -> bool {
    !quiet && atty::is(atty::Stream::Stderr)
}

// ── Error mapping ───────────────────────────────────────────────────

pub fn api_error(err: ApiError) -> CliError {
    let hint = match &err {
        ApiError::Auth(..) => Some(format!("check --api-token / {TOKEN_ENV}")),
        ApiError::RateLimited(_) => {
            Some("increase [pacing] delay_ms in the profile and re-run".into())
        }
        _ => None,
    };
    CliError { code: api_exit_code(&err), message: err.to_string(), hint }
}

pub fn db_error(err: DbError) -> CliError {
    let code = match &err {
        DbError::Open { .. } => exit_codes::EXIT_DB_OPEN,
        DbError::Query(_) => exit_codes::EXIT_DB_QUERY,
    };
    CliError { code, message: err.to_string(), hint: None }
}

pub fn config_error(err: SyncError) -> CliError {
    let code = match &err {
        SyncError::ConfigParse(_) | SyncError::ConfigValidation(_) => {
            exit_codes::EXIT_CONFIG_INVALID
        }
        SyncError::UnknownBoard { .. } | SyncError::UnknownLink(_) => {
            exit_codes::EXIT_CONFIG_UNKNOWN_NAME
        }
        SyncError::Report(_) => exit_codes::EXIT_ERROR,
    };
    CliError { code, message: err.to_string(), hint: None }
}
