//! JWT token issuance and claims decoding.

pub mod claims;
pub mod decoder;
pub mod issuer;

pub use claims::{Claims, TokenType};
pub use decoder::{TokenDecoder, peek_claims};
pub use issuer::TokenIssuer;
