//! Read-only extraction from the formulation database.
//!
//! The sync tool never writes to this database; every query here is a
//! SELECT. Records come out in stable id order so repeated runs walk
//! entities in the same sequence.

pub mod error;
pub mod extract;

pub use error::DbError;
pub use extract::{
    load_formulas, load_inci_names, load_ingredients, open, FormulaRecord,
    IngredientRecord, IngredientUsage, InciRecord,
};
pub use rusqlite::Connection;
