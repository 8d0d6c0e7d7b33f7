//! # Storage
//!
//! Storage traits and the file-backed implementation.

pub mod csv;
pub mod traits;

pub use traits::{ConfigStorage, Connection, PlanStorage};
