//! # Inventa Common Library
//!
//! Shared code for the inventa inventory service:
//! - Database models and queries
//! - Sync outcome and run types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
