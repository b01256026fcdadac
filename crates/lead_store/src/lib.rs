//! Lead storage for the lead tracker
//!
//! This crate provides a storage abstraction over leads, sales agents,
//! comments, and tags. It ships an in-memory store (tests and development)
//! and an SQLite store for durable deployments.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
