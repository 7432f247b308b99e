//! # keyhub-store
//!
//! The user-record store seam for KeyHub. The auth core talks to
//! persistence exclusively through the [`UserStore`] trait; this crate
//! also ships [`MemoryUserStore`], an in-process implementation used by
//! tests and embedders that bring no database of their own.

pub mod memory;
pub mod store;

pub use memory::MemoryUserStore;
pub use store::UserStore;
