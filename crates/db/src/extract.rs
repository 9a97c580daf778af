use rusqlite::{Connection, OpenFlags};

use crate::error::DbError;

/// A formula with its ingredient lines.
#[derive(Debug, Clone)]
pub struct FormulaRecord {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub status: String,
    pub ingredients: Vec<IngredientUsage>,
}

impl FormulaRecord {
    /// Name as it appears on the remote board, version suffix included.
    pub fn display_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{} v{}", self.name, self.version)
        }
    }
}

/// One line of a formula: an ingredient and its concentration.
#[derive(Debug, Clone)]
pub struct IngredientUsage {
    pub name: String,
    pub percentage: f64,
    pub inci_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub inci_name: Option<String>,
    pub category: Option<String>,
    /// How many formulas use this ingredient.
    pub usage_count: i64,
}

/// A distinct INCI name and the trade-name ingredients that declare it.
#[derive(Debug, Clone)]
pub struct InciRecord {
    pub name: String,
    pub ingredients: Vec<String>,
}

/// Open the formulation database read-only.
pub fn open(path: &str) -> Result<Connection, DbError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
        DbError::Open { path: path.to_string(), message: e.to_string() }
    })
}

/// All formulas with ingredient lines, ordered by id. Lines within a
/// formula are ordered by concentration (highest first), ties by name.
pub fn load_formulas(conn: &Connection) -> Result<Vec<FormulaRecord>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, version, status FROM formulas ORDER BY id",
    )?;
    let mut formulas: Vec<FormulaRecord> = stmt
        .query_map([], |row| {
            Ok(FormulaRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                version: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                status: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                ingredients: Vec::new(),
            })
        })?
        .collect::<Result<_, _>>()?;

    let index: std::collections::HashMap<i64, usize> =
        formulas.iter().enumerate().map(|(i, f)| (f.id, i)).collect();

    let mut stmt = conn.prepare(
        "SELECT fi.formula_id, i.name, fi.percentage, i.inci_name \
         FROM formula_ingredients fi \
         JOIN ingredients i ON i.id = fi.ingredient_id \
         ORDER BY fi.formula_id, fi.percentage DESC, i.name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            IngredientUsage {
                name: row.get(1)?,
                percentage: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                inci_name: row.get(3)?,
            },
        ))
    })?;
    for row in rows {
        let (formula_id, usage) = row?;
        if let Some(&i) = index.get(&formula_id) {
            formulas[i].ingredients.push(usage);
        }
    }

    Ok(formulas)
}

/// All ingredients with their usage counts, ordered by id.
pub fn load_ingredients(conn: &Connection) -> Result<Vec<IngredientRecord>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.inci_name, i.category, COUNT(fi.formula_id) \
         FROM ingredients i \
         LEFT JOIN formula_ingredients fi ON fi.ingredient_id = i.id \
         GROUP BY i.id ORDER BY i.id",
    )?;
    let records = stmt
        .query_map([], |row| {
            Ok(IngredientRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                inci_name: row.get(2)?,
                category: row.get(3)?,
                usage_count: row.get(4)?,
            })
        })?
        .collect::<Result<_, _>>()?;
    Ok(records)
}

/// Distinct INCI names, each with the ingredients declaring it. Blank
/// INCI values are left out entirely.
pub fn load_inci_names(conn: &Connection) -> Result<Vec<InciRecord>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT inci_name, name FROM ingredients \
         WHERE inci_name IS NOT NULL AND TRIM(inci_name) != '' \
         ORDER BY inci_name, name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut records: Vec<InciRecord> = Vec::new();
    for row in rows {
        let (inci, ingredient) = row?;
        match records.last_mut() {
            Some(last) if last.name == inci => last.ingredients.push(ingredient),
            _ => records.push(InciRecord { name: inci, ingredients: vec![ingredient] }),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE formulas (
                 id INTEGER PRIMARY KEY, name TEXT NOT NULL,
                 version TEXT, status TEXT);
             CREATE TABLE ingredients (
                 id INTEGER PRIMARY KEY, name TEXT NOT NULL,
                 inci_name TEXT, category TEXT);
             CREATE TABLE formula_ingredients (
                 formula_id INTEGER NOT NULL, ingredient_id INTEGER NOT NULL,
                 percentage REAL);

             INSERT INTO formulas VALUES
               (1, 'Hydrating Serum', '1.0', 'approved'),
               (2, 'Night Cream', '2.1', 'draft'),
               (3, 'Empty Base', NULL, NULL);
             INSERT INTO ingredients VALUES
               (10, 'Glycerin', 'Glycerin', 'humectant'),
               (11, 'Rose Water', 'Rosa Damascena Flower Water', 'base'),
               (12, 'Squalane', 'Squalane', 'emollient'),
               (13, 'Fragrance Blend A', '', NULL),
               (14, 'Vegetable Glycerin', 'Glycerin', 'humectant');
             INSERT INTO formula_ingredients VALUES
               (1, 11, 80.0), (1, 10, 5.0), (1, 12, 5.0),
               (2, 12, 20.0), (2, 10, 8.0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn formulas_come_back_with_ordered_lines() {
        let formulas = load_formulas(&sample_db()).unwrap();
        assert_eq!(formulas.len(), 3);

        let serum = &formulas[0];
        assert_eq!(serum.display_name(), "Hydrating Serum v1.0");
        let names: Vec<&str> = serum.ingredients.iter().map(|u| u.name.as_str()).collect();
        // 80% first, then the two 5% lines alphabetically.
        assert_eq!(names, vec!["Rose Water", "Glycerin", "Squalane"]);

        let base = &formulas[2];
        assert_eq!(base.display_name(), "Empty Base");
        assert!(base.ingredients.is_empty());
    }

    #[test]
    fn ingredient_usage_counts_include_zero() {
        let ingredients = load_ingredients(&sample_db()).unwrap();
        assert_eq!(ingredients.len(), 5);
        assert_eq!(ingredients[0].name, "Glycerin");
        assert_eq!(ingredients[0].usage_count, 2);
        assert_eq!(ingredients[3].name, "Fragrance Blend A");
        assert_eq!(ingredients[3].usage_count, 0);
    }

    #[test]
    fn inci_names_deduplicate_and_skip_blanks() {
        let inci = load_inci_names(&sample_db()).unwrap();
        let names: Vec<&str> = inci.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Glycerin", "Rosa Damascena Flower Water", "Squalane"]);
        // Two trade names declare Glycerin.
        assert_eq!(inci[0].ingredients, vec!["Glycerin", "Vegetable Glycerin"]);
    }
}
