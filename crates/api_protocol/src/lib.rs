//! HTTP protocol definitions for the lead tracker API
//!
//! This crate defines the JSON bodies exchanged between the lead server and
//! its clients: request payloads, response views, report rows, and the error
//! body. Field names are camelCase on the wire.

mod error;
pub mod requests;
pub mod responses;
mod types;

pub use error::*;
pub use types::*;
