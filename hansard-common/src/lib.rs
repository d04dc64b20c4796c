//! # Hansard Common Library
//!
//! Shared code for the Hansard explorer crates including:
//! - Record model (talkers, speech parts, speech stats, bill overviews)
//! - Derived metric formulas (tone positivity, stance labels, proportions)
//! - Database schema bootstrap and document importer
//! - Configuration loading
//! - Date utilities

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod time;

pub use error::{Error, Result};
pub use metrics::{SentimentGroupBy, StanceLabel};
