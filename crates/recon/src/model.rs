use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One local entity to be linked: a formula with its ingredient names, or
/// an ingredient with its INCI name. Immutable from this crate's view.
#[derive(Debug, Clone)]
pub struct SourceEntity {
    pub id: i64,
    pub name: String,
    pub attributes: HashMap<String, String>,
    /// Names of the entities the relation column should point at,
    /// in local-store order.
    pub relation_names: Vec<String>,
}

impl SourceEntity {
    pub fn new(id: i64, name: impl Into<String>, relation_names: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: HashMap::new(),
            relation_names,
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// How a name resolved to a remote item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized names are equal.
    Exact,
    /// One normalized name contains the other. Known false-positive source
    /// for short names ("Water" vs "Rose Water"); surfaced in reports.
    Substring,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Terminal state of one entity in a link pass. There are no retry
/// transitions; every entity lands in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LinkState {
    /// No item on the source board matched the entity name.
    SkippedNoSourceItem,
    /// None of the entity's relation names resolved on the target board.
    SkippedNoTargets,
    /// The relation column already holds links; left untouched.
    SkippedAlreadyLinked { existing: usize },
    /// Relation set (or, under dry-run, would have been set).
    Linked { targets: usize },
    /// The update call was rejected; recorded and the pass continued.
    Failed { error: String },
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkippedNoSourceItem => write!(f, "skipped_no_source_item"),
            Self::SkippedNoTargets => write!(f, "skipped_no_targets"),
            Self::SkippedAlreadyLinked { .. } => write!(f, "skipped_already_linked"),
            Self::Linked { .. } => write!(f, "linked"),
            Self::Failed { .. } => write!(f, "failed"),
        }
    }
}

/// Per-entity record in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub entity_id: i64,
    pub entity_name: String,
    #[serde(flatten)]
    pub state: LinkState,
    /// Remote item the entity matched, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_match: Option<MatchKind>,
    /// Relation names that resolved / total relation names.
    pub targets_resolved: usize,
    pub targets_expected: usize,
    /// True when any resolved target came from the substring fallback.
    pub fuzzy_targets: bool,
}

// ---------------------------------------------------------------------------
// Summary + report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkSummary {
    pub total: usize,
    pub linked: usize,
    pub already_linked: usize,
    pub no_source_item: usize,
    pub no_targets: usize,
    pub failed: usize,
}

impl LinkSummary {
    pub fn tally(outcomes: &[LinkOutcome]) -> Self {
        let mut s = Self { total: outcomes.len(), ..Self::default() };
        for o in outcomes {
            match o.state {
                LinkState::Linked { .. } => s.linked += 1,
                LinkState::SkippedAlreadyLinked { .. } => s.already_linked += 1,
                LinkState::SkippedNoSourceItem => s.no_source_item += 1,
                LinkState::SkippedNoTargets => s.no_targets += 1,
                LinkState::Failed { .. } => s.failed += 1,
            }
        }
        s
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub link_name: String,
    pub dry_run: bool,
    pub run_at: String,
    pub engine_version: String,
    pub summary: LinkSummary,
    pub outcomes: Vec<LinkOutcome>,
}

impl RunReport {
    pub fn new(link_name: &str, dry_run: bool, outcomes: Vec<LinkOutcome>) -> Self {
        Self {
            link_name: link_name.to_string(),
            dry_run,
            run_at: chrono::Utc::now().to_rfc3339(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            summary: LinkSummary::tally(&outcomes),
            outcomes,
        }
    }
}
