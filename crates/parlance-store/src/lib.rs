//! Parlance storage crate - record stores and persistence sinks.
//!
//! Provides the immutable product catalog, JSON-file-backed order and lead
//! stores (whole-array rewrite on every mutation, corrupt-file recovery on
//! read), and a SQLite-backed check-in repository with migrations.

pub mod catalog;
pub mod checkins;
pub mod db;
pub mod leads;
pub mod migrations;
pub mod orders;
pub mod sink;

pub use catalog::{default_catalog, Catalog, ProductFilter};
pub use checkins::CheckInRepository;
pub use db::Database;
pub use leads::{LeadDraft, LeadStore};
pub use orders::{LineItemRequest, OrderStore};
pub use sink::{read_records, write_records};
