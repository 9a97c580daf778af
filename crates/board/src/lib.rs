//! `formsync-board` — client for the remote board/item/column store.
//!
//! One GraphQL endpoint, blocking reqwest (no async runtime required).
//! All operations go through [`gql::GqlRequest`]: operation text plus a
//! variables map, so argument values are serialized exactly once and
//! never spliced into the query string.

pub mod client;
pub mod gql;
pub mod types;

pub use client::{ApiError, BoardClient};
pub use types::{Board, BoardKind, Column, ColumnType, Item};
