use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SyncError;
use crate::pacing::{FixedDelay, Pacer, TokenBucket};

// ---------------------------------------------------------------------------
// Top-level profile
// ---------------------------------------------------------------------------

/// One sync profile: which remote boards exist, which relation links are
/// maintained between them, and how writes are paced. The API token is
/// deliberately not part of the profile — it comes from flag or env.
#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub name: String,
    pub boards: HashMap<String, BoardRef>,
    #[serde(default)]
    pub links: HashMap<String, LinkConfig>,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// A remote board, referenced by profile key (e.g. `formulas`).
#[derive(Debug, Clone, Deserialize)]
pub struct BoardRef {
    pub id: String,
}

/// One relation to maintain: items on `source` get their
/// `relation_column` pointed at items on `target`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub source: String,
    pub target: String,
    pub relation_column: String,
    /// Which local dataset supplies the entities (and their related
    /// names) for this link.
    pub entities: EntityKind,
}

/// Local dataset feeding a link. Formulas relate to their ingredient
/// lines; ingredients relate to their declared INCI name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Formulas,
    Ingredients,
}

// ---------------------------------------------------------------------------
// Pacing + matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStrategy {
    FixedDelay,
    TokenBucket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_pacing_strategy")]
    pub strategy: PacingStrategy,
    /// Fixed-delay interval between writes. The scripts this replaces used
    /// hard-coded sleeps between 100 and 1000ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Token-bucket burst size.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Token-bucket refill rate (writes per second).
    #[serde(default = "default_refill")]
    pub refill_per_sec: f64,
}

fn default_pacing_strategy() -> PacingStrategy {
    PacingStrategy::FixedDelay
}

fn default_delay_ms() -> u64 {
    500
}

fn default_capacity() -> u32 {
    5
}

fn default_refill() -> f64 {
    2.0
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            strategy: default_pacing_strategy(),
            delay_ms: default_delay_ms(),
            capacity: default_capacity(),
            refill_per_sec: default_refill(),
        }
    }
}

impl PacingConfig {
    pub fn build_pacer(&self) -> Box<dyn Pacer> {
        match self.strategy {
            PacingStrategy::FixedDelay => {
                Box::new(FixedDelay::new(Duration::from_millis(self.delay_ms)))
            }
            PacingStrategy::TokenBucket => {
                Box::new(TokenBucket::new(self.capacity, self.refill_per_sec))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_true")]
    pub allow_substring: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { allow_substring: true }
    }
}

// ---------------------------------------------------------------------------
// Parse + validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, SyncError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.boards.is_empty() {
            return Err(SyncError::ConfigValidation(
                "at least one board is required".into(),
            ));
        }

        for (board_name, board) in &self.boards {
            if board.id.trim().is_empty() {
                return Err(SyncError::ConfigValidation(format!(
                    "board '{board_name}' has an empty id"
                )));
            }
        }

        for (link_name, link) in &self.links {
            for board in [&link.source, &link.target] {
                if !self.boards.contains_key(board) {
                    return Err(SyncError::UnknownBoard {
                        link: link_name.clone(),
                        board: board.clone(),
                    });
                }
            }
            if link.relation_column.trim().is_empty() {
                return Err(SyncError::ConfigValidation(format!(
                    "link '{link_name}' has an empty relation_column"
                )));
            }
        }

        match self.pacing.strategy {
            PacingStrategy::FixedDelay => {
                if self.pacing.delay_ms == 0 {
                    return Err(SyncError::ConfigValidation(
                        "fixed_delay pacing requires delay_ms > 0".into(),
                    ));
                }
            }
            PacingStrategy::TokenBucket => {
                if self.pacing.capacity == 0 || self.pacing.refill_per_sec <= 0.0 {
                    return Err(SyncError::ConfigValidation(
                        "token_bucket pacing requires capacity > 0 and refill_per_sec > 0".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn board(&self, name: &str) -> Result<&BoardRef, SyncError> {
        self.boards
            .get(name)
            .ok_or_else(|| SyncError::UnknownBoard {
                link: "<cli>".into(),
                board: name.into(),
            })
    }

    pub fn link(&self, name: &str) -> Result<&LinkConfig, SyncError> {
        self.links
            .get(name)
            .ok_or_else(|| SyncError::UnknownLink(name.into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Cosmetics sync"

[boards.formulas]
id = "9625728737"

[boards.ingredients]
id = "9625733140"

[boards.inci]
id = "9625740112"

[links.formula_ingredients]
source = "formulas"
target = "ingredients"
relation_column = "board_relation_mkt08v2f"
entities = "formulas"

[links.ingredient_inci]
source = "ingredients"
target = "inci"
relation_column = "board_relation_inci1"
entities = "ingredients"

[pacing]
strategy = "fixed_delay"
delay_ms = 250
"#;

    #[test]
    fn parse_valid_profile() {
        let config = SyncConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Cosmetics sync");
        assert_eq!(config.boards.len(), 3);
        assert_eq!(config.links.len(), 2);
        assert_eq!(config.pacing.delay_ms, 250);
        assert!(config.matching.allow_substring);

        let link = config.link("formula_ingredients").unwrap();
        assert_eq!(link.source, "formulas");
        assert_eq!(link.relation_column, "board_relation_mkt08v2f");
        assert_eq!(link.entities, EntityKind::Formulas);
    }

    #[test]
    fn pacing_defaults_to_fixed_delay_500ms() {
        let config = SyncConfig::from_toml(
            r#"
name = "Minimal"
[boards.formulas]
id = "1"
"#,
        )
        .unwrap();
        assert!(matches!(config.pacing.strategy, PacingStrategy::FixedDelay));
        assert_eq!(config.pacing.delay_ms, 500);
    }

    #[test]
    fn parse_token_bucket() {
        let config = SyncConfig::from_toml(
            r#"
name = "Bucketed"
[boards.formulas]
id = "1"
[pacing]
strategy = "token_bucket"
capacity = 10
refill_per_sec = 1.5
"#,
        )
        .unwrap();
        assert!(matches!(config.pacing.strategy, PacingStrategy::TokenBucket));
        assert_eq!(config.pacing.capacity, 10);
    }

    #[test]
    fn reject_link_to_undeclared_board() {
        let err = SyncConfig::from_toml(
            r#"
name = "Bad"
[boards.formulas]
id = "1"
[links.broken]
source = "formulas"
target = "ingredients"
relation_column = "col"
entities = "formulas"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'ingredients'"));
    }

    #[test]
    fn reject_zero_delay() {
        let err = SyncConfig::from_toml(
            r#"
name = "Bad"
[boards.formulas]
id = "1"
[pacing]
strategy = "fixed_delay"
delay_ms = 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("delay_ms"));
    }

    #[test]
    fn reject_empty_board_id() {
        let err = SyncConfig::from_toml(
            r#"
name = "Bad"
[boards.formulas]
id = "  "
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty id"));
    }

    #[test]
    fn unknown_link_lookup_fails() {
        let config = SyncConfig::from_toml(VALID).unwrap();
        assert!(config.link("nope").is_err());
    }
}
