//! Common pipeline types
//!
//! The error type shared by every stage of the pipeline lives here.

pub mod error;

pub use error::{ConversionError, Result};
