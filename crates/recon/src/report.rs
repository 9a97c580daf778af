use std::path::Path;

use crate::error::SyncError;
use crate::model::{LinkState, RunReport};

/// Write a run report for human review. Format is chosen by extension:
/// `.csv` gets one row per entity, anything else gets pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<(), SyncError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_csv(report, path)
    } else {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| SyncError::Report(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| SyncError::Report(e.to_string()))
    }
}

fn write_csv(report: &RunReport, path: &Path) -> Result<(), SyncError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| SyncError::Report(e.to_string()))?;

    wtr.write_record([
        "entity_id",
        "entity_name",
        "state",
        "source_item_id",
        "targets_resolved",
        "targets_expected",
        "fuzzy_targets",
        "error",
    ])
    .map_err(|e| SyncError::Report(e.to_string()))?;

    for o in &report.outcomes {
        let error = match &o.state {
            LinkState::Failed { error } => error.as_str(),
            _ => "",
        };
        wtr.write_record([
            o.entity_id.to_string().as_str(),
            o.entity_name.as_str(),
            o.state.to_string().as_str(),
            o.source_item_id.as_deref().unwrap_or(""),
            o.targets_resolved.to_string().as_str(),
            o.targets_expected.to_string().as_str(),
            if o.fuzzy_targets { "true" } else { "false" },
            error,
        ])
        .map_err(|e| SyncError::Report(e.to_string()))?;
    }

    wtr.flush().map_err(|e| SyncError::Report(e.to_string()))
}
