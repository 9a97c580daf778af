//! `formsync board` — one-time board and column provisioning.
//!
//! These commands exist so new boards are wired up reproducibly instead
//! of by hand in the UI. They print the created ids; the operator pastes
//! them into the profile.

use std::path::Path;

use clap::ValueEnum;

use formsync_board::gql;
use formsync_board::{BoardKind, ColumnType};

use crate::common;
use crate::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Public,
    Private,
    Share,
}

impl From<KindArg> for BoardKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Public => BoardKind::Public,
            KindArg::Private => BoardKind::Private,
            KindArg::Share => BoardKind::Share,
        }
    }
}

pub fn cmd_board_create(
    name: &str,
    kind: KindArg,
    description: Option<String>,
    api_token: Option<String>,
    api_base: Option<String>,
) -> Result<(), CliError> {
    let client = common::build_client(api_token, api_base)?;
    let id = client
        .create_board(name, kind.into(), description.as_deref())
        .map_err(common::api_error)?;
    println!("created board '{name}' id {id}");
    println!("add to the profile:\n\n[boards.<key>]\nid = \"{id}\"");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_board_add_column(
    board: &str,
    title: &str,
    column_type: &str,
    target_board: Option<String>,
    relation_column: Option<String>,
    mirror_column: Option<String>,
    config_path: &Path,
    api_token: Option<String>,
    api_base: Option<String>,
) -> Result<(), CliError> {
    let column_type = ColumnType::from_api_str(column_type);
    if let ColumnType::Other(name) = &column_type {
        return Err(CliError::usage(format!("unsupported column type '{name}'")).with_hint(
            "one of: text, long_text, numbers, status, date, checkbox, \
             board_relation, mirror",
        ));
    }

    let board_id = resolve_board(board, config_path)?;

    let defaults = match &column_type {
        ColumnType::BoardRelation => {
            let target = target_board.ok_or_else(|| {
                CliError::usage("board_relation columns require --target-board")
            })?;
            let target_id = resolve_board(&target, config_path)?;
            Some(gql::relation_defaults(&[target_id]))
        }
        ColumnType::Mirror => {
            let (relation, mirror) = match (relation_column, mirror_column) {
                (Some(r), Some(m)) => (r, m),
                _ => {
                    return Err(CliError::usage(
                        "mirror columns require --relation-column and --mirror-column",
                    ))
                }
            };
            Some(gql::mirror_defaults(&relation, &mirror))
        }
        _ => None,
    };

    let client = common::build_client(api_token, api_base)?;
    let column = client
        .create_column(&board_id, title, &column_type, defaults.as_ref())
        .map_err(common::api_error)?;
    println!("created column '{}' id {} on board {board_id}", column.title, column.id);
    Ok(())
}

/// Boards are addressed by profile key when a profile is present, raw id
/// otherwise.
pub fn resolve_board(name: &str, config_path: &Path) -> Result<String, CliError> {
    if config_path.exists() {
        let profile = common::load_profile(config_path)?;
        if let Ok(board) = profile.board(name) {
            return Ok(board.id.clone());
        }
    }
    if name.chars().all(|c| c.is_ascii_digit()) && !name.is_empty() {
        return Ok(name.to_string());
    }
    Err(
        CliError::usage(format!("'{name}' is neither a profile board key nor a numeric board id"))
            .with_hint("declare it under [boards] in the profile or pass the raw id"),
    )
}
