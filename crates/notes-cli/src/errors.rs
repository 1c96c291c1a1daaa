//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use notes_core::NotesError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (stored hot wallet, input file)
    NotFound { message: String, hint: String },

    /// Authentication failed (signature does not match stored data)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Stored data was rejected
    IntegrityFailed(String),

    /// Funding token missing
    FundingRequired(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message)
            | CliError::IntegrityFailed(message)
            | CliError::FundingRequired(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
            CliError::FundingRequired(_) => exit_codes::FUNDING_REQUIRED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }

    /// Map a core error to its CLI form, if it has a dedicated exit code.
    pub fn from_core(err: &NotesError) -> Option<Self> {
        let message = err.to_string();
        match err {
            NotesError::InvalidAddressFormat(_)
            | NotesError::KeyImportFailed(_)
            | NotesError::InvalidCiphertext(_)
            | NotesError::InvalidInput(_) => Some(CliError::InvalidInput(message)),
            NotesError::DecryptionFailed => Some(CliError::auth_failed_with_hint(
                message,
                "Hint: Check that --address and the signature match the ones used to encrypt.",
            )),
            NotesError::SignatureRequest(_) => Some(CliError::AuthFailed {
                message,
                hint: None,
            }),
            NotesError::StorageCorrupted(_) => Some(CliError::IntegrityFailed(message)),
            NotesError::FundingRequired { .. } => Some(CliError::FundingRequired(message)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = vec![
            (
                NotesError::InvalidAddressFormat("0x1".to_string()),
                exit_codes::INVALID_INPUT,
            ),
            (NotesError::DecryptionFailed, exit_codes::AUTH_FAILED),
            (
                NotesError::StorageCorrupted("version".to_string()),
                exit_codes::INTEGRITY_FAILED,
            ),
            (
                NotesError::FundingRequired {
                    coin_type: "WAL".to_string(),
                    faucet: "https://faucet.test".to_string(),
                },
                exit_codes::FUNDING_REQUIRED,
            ),
        ];
        for (err, code) in cases {
            let mapped = CliError::from_core(&err).unwrap();
            assert_eq!(mapped.exit_code(), code, "{}", err);
        }
    }

    #[test]
    fn test_transport_errors_have_no_dedicated_code() {
        assert!(CliError::from_core(&NotesError::Ledger("down".to_string())).is_none());
    }
}
