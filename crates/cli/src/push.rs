//! `formsync push` — mirror local entities as items on a board.
//!
//! Idempotent: an item whose normalized name already exists on the board
//! is skipped, so re-running after a partial failure only creates what is
//! still missing. Nothing is ever deleted.

use std::path::Path;

use clap::ValueEnum;
use serde_json::json;

use formsync_db as db;
use formsync_recon::matcher::normalize;

use crate::common;
use crate::exit_codes::EXIT_SYNC_PARTIAL;
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PushTarget {
    /// Formula records, named "<name> v<version>".
    Formulas,
    /// Trade-name ingredients.
    Ingredients,
    /// Distinct INCI names.
    Inci,
}

impl PushTarget {
    /// Profile board key this target lands on.
    fn board_key(self) -> &'static str {
        match self {
            Self::Formulas => "formulas",
            Self::Ingredients => "ingredients",
            Self::Inci => "inci",
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_push(
    target: PushTarget,
    config_path: &Path,
    db_path: &Path,
    api_token: Option<String>,
    api_base: Option<String>,
    dry_run: bool,
    start_from: usize,
    max_items: Option<usize>,
    batch_size: usize,
    filter: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    if batch_size == 0 {
        return Err(CliError::usage("--batch-size must be at least 1"));
    }
    let filter = parse_filter(target, filter)?;

    let profile = common::load_profile(config_path)?;
    let board_id = profile
        .board(target.board_key())
        .map_err(common::config_error)?
        .id
        .clone();

    let conn = common::open_database(db_path)?;
    let names = local_names(&conn, target, filter.as_deref())?;

    let client = common::build_client(api_token, api_base)?;
    let progress = common::show_progress(quiet);

    let existing = common::snapshot_board(&client, &board_id, None)?;
    if progress {
        eprintln!(
            "Push {}: {} local records, {} items already on board {board_id}{}",
            target.board_key(),
            names.len(),
            existing.len(),
            if dry_run { " (dry run)" } else { "" },
        );
    }

    let window: Vec<&String> = names
        .iter()
        .skip(start_from)
        .take(max_items.unwrap_or(usize::MAX))
        .collect();

    let mut pacer = profile.pacing.build_pacer();
    let mut created = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (i, name) in window.iter().enumerate() {
        if existing.find(name, false).is_some() {
            skipped += 1;
            continue;
        }
        if dry_run {
            created += 1;
            if progress {
                eprintln!("  would create: {name}");
            }
            continue;
        }

        // Sleep between batches of creates, not per item.
        if created > 0 && created % batch_size == 0 {
            pacer.pace();
        }
        match client.create_item(&board_id, name, &json!({})) {
            Ok(_) => {
                created += 1;
                if progress && created % batch_size == 0 {
                    eprintln!("  created {created} so far ({} of {} scanned)", i + 1, window.len());
                }
            }
            Err(e) => {
                failed += 1;
                if progress {
                    eprintln!("  {name} FAILED: {e}");
                }
            }
        }
    }

    println!(
        "{}{}: {} created, {} already present, {} failed",
        target.board_key(),
        if dry_run { " [dry run]" } else { "" },
        created,
        skipped,
        failed,
    );

    if failed > 0 {
        return Err(CliError {
            code: EXIT_SYNC_PARTIAL,
            message: format!("{failed} item creations failed; created items were kept"),
            hint: Some("re-run the same command; existing names are skipped".into()),
        });
    }
    Ok(())
}

/// Names to mirror, deduplicated case-insensitively in first-seen order.
/// The local store can hold near-duplicate names; the board must not.
fn local_names(
    conn: &db::Connection,
    target: PushTarget,
    status_filter: Option<&str>,
) -> Result<Vec<String>, CliError> {
    let raw: Vec<String> = match target {
        PushTarget::Formulas => db::load_formulas(conn)
            .map_err(common::db_error)?
            .iter()
            .filter(|f| status_filter.map_or(true, |s| f.status == s))
            .map(|f| f.display_name())
            .collect(),
        PushTarget::Ingredients => db::load_ingredients(conn)
            .map_err(common::db_error)?
            .into_iter()
            .map(|i| i.name)
            .collect(),
        PushTarget::Inci => db::load_inci_names(conn)
            .map_err(common::db_error)?
            .into_iter()
            .map(|r| r.name)
            .collect(),
    };

    let mut seen = std::collections::HashSet::new();
    Ok(raw
        .into_iter()
        .filter(|name| !normalize(name).is_empty() && seen.insert(normalize(name)))
        .collect())
}

fn parse_filter(target: PushTarget, filter: Option<String>) -> Result<Option<String>, CliError> {
    let Some(filter) = filter else { return Ok(None) };
    if target != PushTarget::Formulas {
        return Err(CliError::usage("--filter only applies to `push formulas`"));
    }
    match filter.split_once('=') {
        Some(("status", value)) if !value.is_empty() => Ok(Some(value.to_string())),
        _ => Err(CliError::usage(format!("unsupported filter '{filter}'"))
            .with_hint("expected status=<value>, e.g. status=approved")),
    }
}
