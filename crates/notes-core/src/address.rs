//! Wallet address validation.
//!
//! Addresses are `0x` followed by 64 hex digits. Every derivation entry point
//! validates its address before touching key material.

use crate::error::{NotesError, Result};

/// Length of the hex portion of an address.
pub const ADDRESS_HEX_LENGTH: usize = 64;

/// Validate wallet address format.
///
/// # Examples
///
/// ```
/// use notes_core::address::validate_address;
///
/// let address = format!("0x{}", "1".repeat(64));
/// assert!(validate_address(&address).is_ok());
/// assert!(validate_address("0x1234").is_err());
/// ```
pub fn validate_address(address: &str) -> Result<()> {
    let hex = address
        .strip_prefix("0x")
        .ok_or_else(|| NotesError::InvalidAddressFormat(format!("missing 0x prefix: {}", address)))?;

    if hex.len() != ADDRESS_HEX_LENGTH {
        return Err(NotesError::InvalidAddressFormat(format!(
            "expected {} hex digits (got {})",
            ADDRESS_HEX_LENGTH,
            hex.len()
        )));
    }

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NotesError::InvalidAddressFormat(
            "address contains non-hex characters".to_string(),
        ));
    }

    Ok(())
}
