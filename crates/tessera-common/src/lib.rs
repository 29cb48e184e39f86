//! # tessera-common
//!
//! Shared error types and constants for TesseraDB.
//!
//! Every TesseraDB crate reports failures through [`TesseraError`], the
//! unified boundary error. The engine's internal layers keep their own
//! narrower error enums and convert into this one at the call boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified error type and error codes
pub mod error;

/// Engine-wide constants
pub mod constants;

pub use error::{ErrorCode, TesseraError, TesseraResult};
