/// Error type for database extraction.
#[derive(Debug)]
pub enum DbError {
    /// Could not open the database file.
    Open { path: String, message: String },
    /// A query failed (missing table, bad column, corrupt file).
    Query(String),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, message } => {
                write!(f, "cannot open database {path}: {message}")
            }
            Self::Query(message) => write!(f, "query failed: {message}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Query(e.to_string())
    }
}
