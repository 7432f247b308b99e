//! # keyhub-auth
//!
//! Issuance, verification, and rotation of paired access/refresh
//! credentials, and the state machine governing a user's session across
//! rotations.
//!
//! ## Modules
//!
//! - `credential` — Argon2id hashing for passwords and refresh-token
//!   fingerprints
//! - `jwt` — signed token creation and claims decoding
//! - `session` — fingerprint persistence over the user store
//! - `service` — the signup/signin/logout/rotate orchestrator

pub mod credential;
pub mod jwt;
pub mod service;
pub mod session;

pub use credential::CredentialHasher;
pub use jwt::{Claims, TokenDecoder, TokenIssuer, TokenType, peek_claims};
pub use service::AuthService;
pub use session::SessionStore;
