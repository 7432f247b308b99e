//! JWT validation and claims extraction.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use keyhub_core::config::auth::AuthConfig;
use keyhub_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates access tokens at the transport boundary.
///
/// Only access tokens get signature verification here. Refresh tokens are
/// validated against the stored fingerprint instead — see the session
/// service — so the decoder deliberately has no refresh-verification path.
#[derive(Clone)]
pub struct TokenDecoder {
    /// HMAC secret key for access token verification.
    access_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            access_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks signature validity, expiration, and that the token type is
    /// access. This is the credential check the transport performs before
    /// handing a user ID to logout or rotate.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.access_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::invalid_credentials("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::invalid_credentials("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::invalid_credentials("Invalid token signature")
                    }
                    _ => AppError::invalid_credentials(format!("Token validation failed: {e}")),
                }
            })?;

        if token_data.claims.token_type != TokenType::Access {
            return Err(AppError::invalid_credentials(
                "Invalid token type: expected access token",
            ));
        }

        Ok(token_data.claims)
    }
}

/// Parses the claims segment of a token without verifying its signature.
///
/// Callers use this to read `{sub, email}` out of a token whose validity
/// is established elsewhere — fingerprint comparison for refresh tokens,
/// [`TokenDecoder::decode_access_token`] for access tokens. A malformed or
/// unparseable token is an invalid credential.
pub fn peek_claims(token: &str) -> Result<Claims, AppError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AppError::invalid_credentials("Malformed token"));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::invalid_credentials("Malformed token payload"))?;

    serde_json::from_slice(&bytes)
        .map_err(|_| AppError::invalid_credentials("Unparseable token claims"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use uuid::Uuid;

    use crate::jwt::issuer::TokenIssuer;

    fn config() -> AuthConfig {
        AuthConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn test_decode_access_token() {
        let cfg = config();
        let pair = TokenIssuer::new(&cfg)
            .generate_token_pair(Uuid::new_v4(), "example@test.com")
            .unwrap();

        let claims = TokenDecoder::new(&cfg)
            .decode_access_token(&pair.access_token)
            .unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_token_rejected_as_access_credential() {
        let cfg = config();
        let pair = TokenIssuer::new(&cfg)
            .generate_token_pair(Uuid::new_v4(), "example@test.com")
            .unwrap();

        // Signed with the refresh secret, so the access key must reject it.
        assert!(
            TokenDecoder::new(&cfg)
                .decode_access_token(&pair.refresh_token)
                .is_err()
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let cfg = config();
        let pair = TokenIssuer::new(&cfg)
            .generate_token_pair(Uuid::new_v4(), "example@test.com")
            .unwrap();

        let mut tampered = pair.access_token.clone();
        tampered.pop();
        assert!(
            TokenDecoder::new(&cfg)
                .decode_access_token(&tampered)
                .is_err()
        );
    }

    #[test]
    fn test_peek_claims_ignores_signature() {
        let cfg = config();
        let pair = TokenIssuer::new(&cfg)
            .generate_token_pair(Uuid::new_v4(), "example@test.com")
            .unwrap();

        // Truncating the signature leaves the payload readable.
        let mut truncated = pair.refresh_token.clone();
        truncated.pop();
        let claims = peek_claims(&truncated).unwrap();
        assert_eq!(claims.email, "example@test.com");
    }

    #[test]
    fn test_peek_claims_rejects_garbage() {
        assert!(peek_claims("").is_err());
        assert!(peek_claims("only-one-segment").is_err());
        assert!(peek_claims("a.b").is_err());
        assert!(peek_claims("a.!!!not-base64!!!.c").is_err());
        assert!(peek_claims("a.b.c.d").is_err());
    }
}
