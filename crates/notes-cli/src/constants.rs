//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (stored hot wallet, input file).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong signature, refused signing).
    pub const AUTH_FAILED: i32 = 5;

    /// Stored data failed validation.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// The wallet does not hold enough of the funding token.
    pub const FUNDING_REQUIRED: i32 = 7;
}

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "NOTES_LOG";

/// Log filter used when neither the environment nor config set one.
pub const DEFAULT_LOG_FILTER: &str = "warn";
