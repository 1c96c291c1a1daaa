//! Ledger client contract and the typed boundary for ledger objects.
//!
//! Ledger queries return loosely structured JSON. Only the fields the session
//! protocol reads are parsed out, and anything that does not fit is rejected
//! here instead of travelling further in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::validate_address;
use crate::error::{NotesError, Result};

/// An object as returned by the ledger, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerObject {
    pub object_id: String,
    pub object_type: String,
    /// Owning address, if the object is address-owned.
    pub owner: Option<String>,
    /// Move struct fields.
    pub fields: serde_json::Value,
}

/// On-chain delegated authorization owned by a hot wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCapability {
    pub object_id: String,
    /// Hot wallet address that owns the capability.
    pub owner: String,
    pub notebook_id: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

impl SessionCapability {
    /// Parse a capability out of a raw ledger object.
    pub fn from_object(object: &LedgerObject) -> Result<Self> {
        validate_address(&object.object_id)
            .map_err(|_| NotesError::InvalidObject(format!("bad object id {}", object.object_id)))?;

        let owner = object
            .owner
            .as_deref()
            .ok_or_else(|| invalid(object, "capability is not address-owned"))?;
        validate_address(owner).map_err(|_| invalid(object, "owner is not an address"))?;

        let fields = object
            .fields
            .as_object()
            .ok_or_else(|| invalid(object, "fields are not an object"))?;

        let expires_at = match fields.get("expires_at") {
            Some(serde_json::Value::Number(n)) => n.as_i64(),
            // u64 fields arrive as decimal strings
            Some(serde_json::Value::String(s)) => s.parse::<i64>().ok(),
            _ => None,
        }
        .filter(|value| *value > 0)
        .ok_or_else(|| invalid(object, "missing or malformed expires_at"))?;

        let notebook_id = fields
            .get("notebook_id")
            .and_then(|value| value.as_str())
            .ok_or_else(|| invalid(object, "missing notebook_id"))?;

        Ok(Self {
            object_id: object.object_id.clone(),
            owner: owner.to_string(),
            notebook_id: notebook_id.to_string(),
            expires_at,
        })
    }

    /// Whether the capability has expired at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

fn invalid(object: &LedgerObject, reason: &str) -> NotesError {
    NotesError::InvalidObject(format!("{} ({})", reason, object.object_id))
}

/// Transactions the session protocol submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerTransaction {
    /// Create a capability for `hot_wallet_address` and fund it with gas and
    /// the funding token.
    CreateSessionCapability {
        package_id: String,
        notebook_id: String,
        hot_wallet_address: String,
        expires_at: i64,
        gas_funding: u64,
        token_funding: u64,
        funding_coin_type: String,
    },
}

/// Result of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub digest: String,
}

/// The ledger as seen by the session protocol.
///
/// Implementations own transport concerns (RPC endpoints, retries, signing
/// through the user's wallet) and report failures as `NotesError::Ledger`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Objects of `struct_type` owned by `owner`.
    async fn get_owned_objects_by_type(
        &self,
        owner: &str,
        struct_type: &str,
    ) -> Result<Vec<LedgerObject>>;

    /// A single object by id, `None` if it does not exist or was deleted.
    async fn get_object(&self, object_id: &str) -> Result<Option<LedgerObject>>;

    /// Total balance of `coin_type` held by `owner`.
    async fn get_balance(&self, owner: &str, coin_type: &str) -> Result<u128>;

    /// Sign (through the user's wallet) and execute a transaction.
    async fn submit_transaction(&self, transaction: &LedgerTransaction)
        -> Result<TransactionReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(fields: serde_json::Value) -> LedgerObject {
        LedgerObject {
            object_id: format!("0x{}", "c".repeat(64)),
            object_type: "0xpkg::session::SessionCap".to_string(),
            owner: Some(format!("0x{}", "d".repeat(64))),
            fields,
        }
    }

    #[test]
    fn test_parse_numeric_expiry() {
        let cap = SessionCapability::from_object(&object(json!({
            "expires_at": 1_700_000_000_000_i64,
            "notebook_id": "0xnotebook"
        })))
        .unwrap();
        assert_eq!(cap.expires_at, 1_700_000_000_000);
        assert_eq!(cap.notebook_id, "0xnotebook");
        assert_eq!(cap.owner, format!("0x{}", "d".repeat(64)));
    }

    #[test]
    fn test_parse_string_expiry() {
        let cap = SessionCapability::from_object(&object(json!({
            "expires_at": "1700000000000",
            "notebook_id": "nb"
        })))
        .unwrap();
        assert_eq!(cap.expires_at, 1_700_000_000_000);
    }

    #[test]
    fn test_rejects_unexpected_shapes() {
        let cases = vec![
            json!([]),
            json!({ "notebook_id": "nb" }),
            json!({ "expires_at": "soon", "notebook_id": "nb" }),
            json!({ "expires_at": -5, "notebook_id": "nb" }),
            json!({ "expires_at": 10, "notebook_id": 42 }),
        ];
        for fields in cases {
            let result = SessionCapability::from_object(&object(fields.clone()));
            assert!(
                matches!(result, Err(NotesError::InvalidObject(_))),
                "accepted {}",
                fields
            );
        }
    }

    #[test]
    fn test_rejects_shared_or_bad_owner() {
        let mut shared = object(json!({ "expires_at": 10, "notebook_id": "nb" }));
        shared.owner = None;
        assert!(SessionCapability::from_object(&shared).is_err());

        let mut bad_id = object(json!({ "expires_at": 10, "notebook_id": "nb" }));
        bad_id.object_id = "0x12".to_string();
        assert!(SessionCapability::from_object(&bad_id).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let cap = SessionCapability::from_object(&object(json!({
            "expires_at": 1_000,
            "notebook_id": "nb"
        })))
        .unwrap();
        assert!(!cap.is_expired_at(999));
        assert!(cap.is_expired_at(1_000));
    }
}
