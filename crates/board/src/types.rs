use serde::{Deserialize, Serialize};

/// A board: a named collection of items with a fixed column schema.
#[derive(Debug, Clone)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub items_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardKind {
    Public,
    Private,
    Share,
}

impl BoardKind {
    /// Enum literal embedded in the create_board mutation (the remote
    /// rejects it as a quoted string variable).
    pub fn as_graphql(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Share => "share",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub column_type: ColumnType,
}

/// The fixed column-type vocabulary this system touches. Anything else
/// the remote reports parses as `Other` and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    LongText,
    Numbers,
    Status,
    Date,
    Checkbox,
    /// Set of item ids on another (declared) board.
    BoardRelation,
    /// Read-only projection of a column on a linked item.
    Mirror,
    Other(String),
}

impl ColumnType {
    pub fn as_api_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Numbers => "numbers",
            Self::Status => "status",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::BoardRelation => "board_relation",
            Self::Mirror => "mirror",
            Self::Other(s) => s,
        }
    }

    pub fn from_api_str(s: &str) -> Self {
        match s {
            "text" => Self::Text,
            "long_text" => Self::LongText,
            "numbers" => Self::Numbers,
            "status" => Self::Status,
            "date" => Self::Date,
            "checkbox" => Self::Checkbox,
            "board_relation" => Self::BoardRelation,
            "mirror" => Self::Mirror,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

/// A single item (row) on a board, as held for one sync run: id, name,
/// and the linked ids of at most one relation column.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub linked_ids: Vec<String>,
}
