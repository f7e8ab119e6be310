//! # laundrix-core
//!
//! Core crate for the Laundrix admin console. Contains configuration
//! schemas, typed identifiers, console roles, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Laundrix crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
