//! Application-level utilities for the Notes CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - Lazily loaded configuration and device services

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::{resolve_config_path, resolve_store_path};
