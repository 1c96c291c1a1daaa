//! Input helper functions for the CLI.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Password;
use notes_core::crypto::WalletSignature;

use crate::cli::Cli;
use crate::errors::CliError;

/// Resolve the wallet signature from `--signature` / `NOTES_SIGNATURE`, or
/// prompt for it on a TTY.
pub fn resolve_signature(cli: &Cli) -> anyhow::Result<WalletSignature> {
    if let Some(value) = cli.signature.as_deref() {
        if !value.trim().is_empty() {
            return Ok(WalletSignature::from_base64(value.trim())?);
        }
    }

    let interactive = io::stdin().is_terminal() && !cli.no_input;
    if !interactive {
        return Err(CliError::invalid_input(
            "No signature provided and no TTY available. Set NOTES_SIGNATURE or pass --signature.",
        )
        .into());
    }

    let value = Password::new()
        .with_prompt("Wallet signature (base64)")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read signature: {}", e))?;
    Ok(WalletSignature::from_base64(value.trim())?)
}

/// Read all input from a file, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::not_found(
                    format!("Input file not found: {}", path.display()),
                    "Hint: Omit INPUT to read from stdin.",
                )
                .into());
            }
            std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
