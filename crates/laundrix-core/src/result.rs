//! Convenience result type alias for Laundrix.

use crate::error::AppError;

/// A specialized `Result` type for Laundrix operations.
pub type AppResult<T> = Result<T, AppError>;
