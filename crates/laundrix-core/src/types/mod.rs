//! Core type definitions used across the Laundrix workspace.

pub mod id;
pub mod role;

pub use id::*;
pub use role::ConsoleRole;
