use crate::model::MatchKind;

/// Lowercase + trim. Both sides of every comparison go through this.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolve `query` against `candidates` (normalized names, in remote API
/// order). Exact equality is checked across the whole candidate set before
/// any substring test, so an exact match always beats a fuzzy one. The
/// substring pass accepts the first candidate where either name contains
/// the other — ties resolve by iteration order, which is whatever order
/// the remote returned.
pub fn find_match(
    query: &str,
    candidates: &[String],
    allow_substring: bool,
) -> Option<(usize, MatchKind)> {
    let needle = normalize(query);
    if needle.is_empty() {
        return None;
    }

    for (i, cand) in candidates.iter().enumerate() {
        if *cand == needle {
            return Some((i, MatchKind::Exact));
        }
    }

    if allow_substring {
        for (i, cand) in candidates.iter().enumerate() {
            if cand.is_empty() {
                continue;
            }
            if cand.contains(&needle) || needle.contains(cand.as_str()) {
                return Some((i, MatchKind::Substring));
            }
        }
    }

    None
}
