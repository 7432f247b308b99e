//! Credential hashing for passwords and refresh-token fingerprints.

pub mod hasher;

pub use hasher::CredentialHasher;
