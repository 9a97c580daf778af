//! `formsync link` — one reconciliation pass for a configured link.

use std::path::{Path, PathBuf};

use formsync_board::BoardClient;
use formsync_recon::reconcile::{run_link_pass, LinkPassOptions, RelationWriter};
use formsync_recon::report::write_report;
use formsync_recon::{LinkState, RunReport, WriteError};

use crate::common;
use crate::exit_codes::EXIT_SYNC_PARTIAL;
use crate::CliError;

/// Backs the engine's write seam with the GraphQL client. API failures
/// become contained [`WriteError`]s so the pass keeps going.
struct ApiRelationWriter<'a> {
    client: &'a BoardClient,
}

impl RelationWriter for ApiRelationWriter<'_> {
    fn set_relation(
        &mut self,
        board_id: &str,
        item_id: &str,
        column_id: &str,
        target_ids: &[String],
    ) -> Result<(), WriteError> {
        self.client
            .set_relation(board_id, item_id, column_id, target_ids)
            .map_err(|e| WriteError::new(e.to_string()))
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_link(
    link_name: &str,
    config_path: &Path,
    db_path: &Path,
    api_token: Option<String>,
    api_base: Option<String>,
    dry_run: bool,
    start_from: usize,
    max_items: Option<usize>,
    report_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let profile = common::load_profile(config_path)?;
    let link = profile.link(link_name).map_err(common::config_error)?.clone();
    let source_board = profile.board(&link.source).map_err(common::config_error)?.id.clone();
    let target_board = profile.board(&link.target).map_err(common::config_error)?.id.clone();

    let conn = common::open_database(db_path)?;
    let entities = common::load_entities(&conn, link.entities)?;

    let client = common::build_client(api_token, api_base)?;
    let progress = common::show_progress(quiet);

    if progress {
        eprintln!(
            "Link '{link_name}': {} entities, board {source_board} -> board {target_board}{}",
            entities.len(),
            if dry_run { " (dry run)" } else { "" },
        );
    }

    let source = common::snapshot_board(&client, &source_board, Some(&link.relation_column))?;
    let targets = common::snapshot_board(&client, &target_board, None)?;
    if progress {
        eprintln!("  fetched {} source items, {} target items", source.len(), targets.len());
    }

    let opts = LinkPassOptions {
        dry_run,
        allow_substring: profile.matching.allow_substring,
        start_from,
        max_items,
    };
    let mut writer = ApiRelationWriter { client: &client };
    let mut pacer = profile.pacing.build_pacer();

    let report = run_link_pass(
        link_name,
        &source_board,
        &link.relation_column,
        &entities,
        &source,
        &targets,
        &mut writer,
        pacer.as_mut(),
        &opts,
    );

    print_summary(&report, progress);

    if let Some(path) = &report_path {
        write_report(&report, path).map_err(common::config_error)?;
        if progress {
            eprintln!("  report written to {}", path.display());
        }
    }

    if report.summary.failed > 0 {
        return Err(CliError {
            code: EXIT_SYNC_PARTIAL,
            message: format!(
                "{} of {} updates failed; successful links were kept",
                report.summary.failed, report.summary.total,
            ),
            hint: Some("re-run the same command; completed links are skipped".into()),
        });
    }
    Ok(())
}

fn print_summary(report: &RunReport, progress: bool) {
    let s = &report.summary;
    println!(
        "{}{}: {} linked, {} already linked, {} no board item, {} no targets, {} failed ({} total)",
        report.link_name,
        if report.dry_run { " [dry run]" } else { "" },
        s.linked,
        s.already_linked,
        s.no_source_item,
        s.no_targets,
        s.failed,
        s.total,
    );

    if progress {
        for outcome in &report.outcomes {
            match &outcome.state {
                LinkState::Linked { targets } => {
                    let fuzzy = if outcome.fuzzy_targets { " (fuzzy)" } else { "" };
                    eprintln!(
                        "  {} -> {} of {} targets{fuzzy}",
                        outcome.entity_name, targets, outcome.targets_expected,
                    );
                }
                LinkState::Failed { error } => {
                    eprintln!("  {} FAILED: {error}", outcome.entity_name);
                }
                _ => {}
            }
        }
    }
}
