use std::fmt;

#[derive(Debug)]
pub enum SyncError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Profile validation error (bad pacing values, dangling references).
    ConfigValidation(String),
    /// A link references a board name that is not declared.
    UnknownBoard { link: String, board: String },
    /// A requested link name does not exist in the profile.
    UnknownLink(String),
    /// Report file write error.
    Report(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "profile parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "profile validation error: {msg}"),
            Self::UnknownBoard { link, board } => {
                write!(f, "link '{link}': board '{board}' not declared in profile")
            }
            Self::UnknownLink(name) => write!(f, "unknown link: {name}"),
            Self::Report(msg) => write!(f, "report write error: {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// A single rejected create/update call.
///
/// Contained per entity: recorded in the run report, never aborts a pass.
#[derive(Debug, Clone)]
pub struct WriteError {
    pub message: String,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WriteError {}
