//! CLI Exit Code Registry
//!
//! Single source of truth for all exit codes. Exit codes are part of the
//! shell contract — cron jobs and CI steps branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                  |
//! |---------|-----------|----------------------------------------------|
//! | 0       | Universal | Success                                      |
//! | 1       | Universal | General error (unspecified)                  |
//! | 2       | Universal | CLI usage error (bad args, missing file)     |
//! | 3       | sync      | Pass completed but some writes failed        |
//! | 10-19   | db        | Local formulation database                   |
//! | 20-29   | config    | Sync profile (TOML)                          |
//! | 50-59   | api       | Remote board API                             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

use formsync_board::ApiError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Sync (3)
// =============================================================================

/// The pass ran to completion but at least one write was rejected.
/// Partial progress is kept; a re-run picks up where the failures left off.
pub const EXIT_SYNC_PARTIAL: u8 = 3;

// =============================================================================
// Database (10-19)
// =============================================================================

/// Cannot open the formulation database file.
pub const EXIT_DB_OPEN: u8 = 10;

/// A query failed (missing table, corrupt file).
pub const EXIT_DB_QUERY: u8 = 11;

// =============================================================================
// Config (20-29)
// =============================================================================

/// Profile file missing or unreadable.
pub const EXIT_CONFIG_READ: u8 = 20;

/// Profile failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 21;

/// Command referenced a board or link the profile does not declare.
pub const EXIT_CONFIG_UNKNOWN_NAME: u8 = 22;

// =============================================================================
// Remote API (50-59)
// =============================================================================

/// No API token (flag absent and FORMSYNC_API_TOKEN unset).
pub const EXIT_API_NO_TOKEN: u8 = 50;

/// Token rejected by the remote (401/403).
pub const EXIT_API_AUTH: u8 = 51;

/// Request rejected (GraphQL errors, unexpected payload, other 4xx/5xx).
pub const EXIT_API_REJECTED: u8 = 52;

/// Rate limited (429).
pub const EXIT_API_RATE_LIMITED: u8 = 53;

/// Network failure (DNS, TLS, timeout).
pub const EXIT_API_NETWORK: u8 = 54;

/// Map a board API error to its exit code.
pub fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::Auth(..) => EXIT_API_AUTH,
        ApiError::Network(_) => EXIT_API_NETWORK,
        ApiError::RateLimited(_) => EXIT_API_RATE_LIMITED,
        ApiError::Http(..) | ApiError::Parse(_) | ApiError::GraphQl(_) => EXIT_API_REJECTED,
        ApiError::InvalidRequest(_) => EXIT_USAGE,
    }
}
