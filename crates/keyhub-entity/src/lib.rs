//! # keyhub-entity
//!
//! Domain entity models for KeyHub. Every struct in this crate represents
//! a user-store record or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, and `Deserialize`; secret-bearing fields
//! are never serialized.

pub mod token;
pub mod user;

pub use token::TokenPair;
pub use user::User;
