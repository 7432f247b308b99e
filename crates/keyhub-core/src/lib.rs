//! # keyhub-core
//!
//! Core crate for KeyHub. Contains configuration schemas, logging setup,
//! and the unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other KeyHub crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
