//! Ingest pipeline: field cleaners → row normalizer → sheet collector
//!
//! One-directional flow from raw sheet rows to normalized
//! `InventoryRecord`s. Every stage is failure-isolating: a bad cell
//! yields a default, a bad row is skipped, a bad sheet is skipped.

pub mod cleaners;
pub mod collector;
pub mod normalizer;

pub use collector::{collect_all, CollectStats};
pub use normalizer::normalize_row;
