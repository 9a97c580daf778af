use serde::Serialize;

use crate::cache::BoardCache;

/// Connection coverage for one link, computed against a re-fetched board.
/// Purely observational; has no effect on the sync itself.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub connected: usize,
    pub total_expected: usize,
}

impl Coverage {
    pub fn percent(&self) -> f64 {
        if self.total_expected == 0 {
            0.0
        } else {
            self.connected as f64 * 100.0 / self.total_expected as f64
        }
    }
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} connected ({:.1}%)",
            self.connected,
            self.total_expected,
            self.percent()
        )
    }
}

/// Count how many expected local names resolve to an item whose relation
/// column is populated.
pub fn compute(snapshot: &BoardCache, expected_names: &[String], allow_substring: bool) -> Coverage {
    let connected = expected_names
        .iter()
        .filter(|name| {
            snapshot
                .find(name, allow_substring)
                .is_some_and(|(item, _)| !item.linked_ids.is_empty())
        })
        .count();

    Coverage { connected, total_expected: expected_names.len() }
}
