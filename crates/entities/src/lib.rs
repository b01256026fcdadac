//! Core entity definitions for the lead tracker.
//!
//! This crate defines the domain types shared by the store and the server:
//! leads and their lifecycle, sales agents, comments, and tags.

mod agent;
mod comment;
mod lead;
mod tag;

pub use agent::*;
pub use comment::*;
pub use lead::*;
pub use tag::*;
