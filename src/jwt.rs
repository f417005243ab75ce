//! JWT token generation and validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::{User, UserRole};

/// Token type for distinguishing access vs refresh tokens.
///
/// Both are signed with the same process-wide secret; the `typ` claim keeps
/// one from being replayed as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token (1 hour)
    Access,
    /// Long-lived refresh token (7 days)
    Refresh,
}

/// Claims carried by a session token.
///
/// Decoded claims are immutable per-request values; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Login identifier
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access token duration: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Result of generating a token.
#[derive(Debug, Clone)]
pub struct TokenResult {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    fn generate(&self, user: &User, token_type: TokenType, duration: u64) -> Result<TokenResult, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = SessionClaims {
            sub: user.uuid.clone(),
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            token_type,
            iat: now,
            exp: now + duration,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(TokenResult { token, duration })
    }

    /// Generate a short-lived access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<TokenResult, JwtError> {
        self.generate(user, TokenType::Access, ACCESS_TOKEN_DURATION_SECS)
    }

    /// Generate a long-lived refresh token for a user.
    pub fn generate_refresh_token(&self, user: &User) -> Result<TokenResult, JwtError> {
        self.generate(user, TokenType::Refresh, REFRESH_TOKEN_DURATION_SECS)
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::from_decoding)?;

        if token_data.claims.token_type != expected {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.validate(token, TokenType::Access)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.validate(token, TokenType::Refresh)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token expiry is in the past
    Expired,
    /// Signature does not verify against the process secret
    InvalidSignature,
    /// Token is structurally invalid or carries fields outside the
    /// closed sets (e.g. an unknown role)
    Malformed,
    /// System time error
    TimeError,
    /// Wrong token type (e.g., using refresh token as access token)
    WrongTokenType,
}

impl JwtError {
    fn from_decoding(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::Malformed,
        }
    }
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::InvalidSignature => write!(f, "Token signature is invalid"),
            JwtError::Malformed => write!(f, "Token is malformed"),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: UserRole) -> User {
        User {
            id: 1,
            uuid: "uuid-123".to_string(),
            user_id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password_hash: String::new(),
            role,
            is_active: true,
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config
            .generate_access_token(&test_user(UserRole::User))
            .unwrap();

        assert_eq!(result.duration, ACCESS_TOKEN_DURATION_SECS);

        let claims = config.validate_access_token(&result.token).unwrap();
        assert_eq!(claims.sub, "uuid-123");
        assert_eq!(claims.user_id, "alice");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp, claims.iat + ACCESS_TOKEN_DURATION_SECS);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config
            .generate_refresh_token(&test_user(UserRole::Admin))
            .unwrap();

        assert_eq!(result.duration, REFRESH_TOKEN_DURATION_SECS);

        let claims = config.validate_refresh_token(&result.token).unwrap();
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let access = config
            .generate_access_token(&test_user(UserRole::User))
            .unwrap();
        let refresh = config
            .generate_refresh_token(&test_user(UserRole::User))
            .unwrap();

        assert!(matches!(
            config.validate_refresh_token(&access.token),
            Err(JwtError::WrongTokenType)
        ));
        assert!(matches!(
            config.validate_access_token(&refresh.token),
            Err(JwtError::WrongTokenType)
        ));
    }

    #[test]
    fn test_super_admin_role_round_trips() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config
            .generate_access_token(&test_user(UserRole::SuperAdmin))
            .unwrap();

        let claims = config.validate_access_token(&result.token).unwrap();
        assert_eq!(claims.role, UserRole::SuperAdmin);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        assert!(matches!(
            config.validate_access_token("not-a-token"),
            Err(JwtError::Malformed)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let config1 = JwtConfig::new(b"secret-1");
        let config2 = JwtConfig::new(b"secret-2");

        let result = config1
            .generate_access_token(&test_user(UserRole::User))
            .unwrap();

        assert!(matches!(
            config2.validate_access_token(&result.token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config
            .generate_access_token(&test_user(UserRole::User))
            .unwrap();

        // Flip the last character of the signature segment.
        let mut token = result.token;
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            config.validate_access_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let secret = b"test-secret";
        let encoding_key = EncodingKey::from_secret(secret);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = SessionClaims {
            sub: "uuid-123".to_string(),
            user_id: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: UserRole::User,
            token_type: TokenType::Access,
            iat: now - 100,
            exp: now - 50, // Expired 50 seconds ago
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        let config = JwtConfig::new(secret);
        assert!(matches!(
            config.validate_access_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let secret = b"test-secret";
        let encoding_key = EncodingKey::from_secret(secret);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Role outside the closed set must not be coerced.
        let claims = serde_json::json!({
            "sub": "uuid-123",
            "userId": "alice",
            "name": "Alice",
            "email": "alice@example.com",
            "role": "owner",
            "typ": "access",
            "iat": now,
            "exp": now + 300,
        });

        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        let config = JwtConfig::new(secret);
        assert!(matches!(
            config.validate_access_token(&token),
            Err(JwtError::Malformed)
        ));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config
            .generate_access_token(&test_user(UserRole::User))
            .unwrap();

        let first = config.validate_access_token(&result.token).unwrap();
        let second = config.validate_access_token(&result.token).unwrap();
        assert_eq!(first, second);
    }
}
