//! `formsync-recon` — board-link reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded local entities and board
//! snapshots, decides per-entity outcomes, and issues writes through the
//! [`RelationWriter`] seam. No CLI, HTTP, or database dependencies.

pub mod cache;
pub mod config;
pub mod coverage;
pub mod error;
pub mod matcher;
pub mod model;
pub mod pacing;
pub mod reconcile;
pub mod report;

pub use cache::BoardCache;
pub use config::{EntityKind, SyncConfig};
pub use error::{SyncError, WriteError};
pub use model::{LinkOutcome, LinkState, LinkSummary, RunReport, SourceEntity};
pub use pacing::Pacer;
pub use reconcile::{run_link_pass, LinkPassOptions, RelationWriter};
