//! Parlance core crate - shared types, errors, and configuration.
//!
//! Defines the record types (products, orders, leads, check-ins) used by
//! every Parlance crate, the top-level error taxonomy, and the TOML-backed
//! application configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::ParlanceConfig;
pub use error::{ParlanceError, Result};
pub use types::*;
