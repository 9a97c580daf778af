//! `formsync coverage` — how much of a link is connected right now.
//!
//! Observational only: re-fetches the source board and counts items whose
//! relation column is populated against the local entities that expect
//! links.

use std::path::Path;

use formsync_recon::coverage;

use crate::common;
use crate::CliError;

pub fn cmd_coverage(
    link_name: &str,
    config_path: &Path,
    db_path: &Path,
    api_token: Option<String>,
    api_base: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let profile = common::load_profile(config_path)?;
    let link = profile.link(link_name).map_err(common::config_error)?.clone();
    let source_board = profile.board(&link.source).map_err(common::config_error)?.id.clone();

    let conn = common::open_database(db_path)?;
    let entities = common::load_entities(&conn, link.entities)?;
    // Every local entity counts toward the denominator, including ones
    // with nothing to resolve; those surface as permanently missing.
    let expected: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();

    let client = common::build_client(api_token, api_base)?;
    if common::show_progress(quiet) {
        eprintln!("Coverage '{link_name}': fetching board {source_board}");
    }
    let snapshot = common::snapshot_board(&client, &source_board, Some(&link.relation_column))?;

    let coverage = coverage::compute(&snapshot, &expected, profile.matching.allow_substring);
    println!("{link_name}: {coverage}");

    if !quiet {
        for name in &expected {
            let connected = snapshot
                .find(name, profile.matching.allow_substring)
                .map_or(false, |(item, _)| !item.linked_ids.is_empty());
            if !connected {
                println!("  missing: {name}");
            }
        }
    }
    Ok(())
}
