//! Service layer for movie search business logic.
//!
//! This module contains domain logic separated from UI concerns.

pub mod indexer;

pub use indexer::{IndexError, IndexEvent, IndexReport, IndexService};
