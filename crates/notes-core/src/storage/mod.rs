//! Local persistent storage for notes.
//!
//! This module defines the `KeyValueStore` trait and its backends.
//!
//! ## Architecture
//!
//! The core never assumes a particular backing:
//! - `SqliteStore`: durable, one SQLite file per device profile
//! - `MemoryStore`: process-lifetime, for tests and embedded callers
//!
//! ## Security
//!
//! Nothing secret is written in plaintext. The hot-wallet record is sealed
//! under the content key before it reaches a store, and every read is
//! validated by its owner.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;
