use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;
use crate::AppState;

/// Every generated key starts with this marker
pub const API_KEY_PREFIX: &str = "ak_";
pub const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_RANDOM_LEN: usize = 32;
/// Random characters kept in the display prefix
const DISPLAY_CHARS: usize = 8;
/// Upper bound on token lifetime (one year)
const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(user_id: Uuid, secret: &[u8], ttl_seconds: u64) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let ttl = chrono::Duration::seconds(ttl_seconds.min(MAX_TOKEN_TTL_SECONDS) as i64);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Token verification error: {:?}", e);
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}

/// Hash a password with Argon2 and a fresh salt, returning the PHC string
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a new API key with format ak_<32 alphanumeric chars>
pub fn generate_api_key() -> String {
    let random_part: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", API_KEY_PREFIX, random_part)
}

/// Hash an API key using SHA-256
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// The part of a key that is safe to show again after creation
pub fn key_prefix(api_key: &str) -> String {
    api_key
        .chars()
        .take(API_KEY_PREFIX.len() + DISPLAY_CHARS)
        .collect()
}

pub fn is_api_key_format(value: &str) -> bool {
    value.starts_with(API_KEY_PREFIX) && value.len() == API_KEY_PREFIX.len() + API_KEY_RANDOM_LEN
}

/// Verify an API key, count the use, and return its owner
pub async fn verify_api_key(api_key: &str, store: &dyn Store) -> Result<Uuid, ApiError> {
    if !is_api_key_format(api_key) {
        return Err(ApiError::Unauthorized);
    }

    let record = store
        .record_api_key_use(&hash_api_key(api_key))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    tracing::debug!(
        "API key {} used by user {} (count {})",
        record.id,
        record.user_id,
        record.usage_count
    );
    Ok(record.user_id)
}

/// How the caller proved their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Jwt,
    ApiKey,
}

/// Caller resolved from either a JWT or an API key
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub method: AuthMethod,
}

/// Extract the caller from `X-API-Key` or `Authorization: Bearer`.
///
/// Bearer values starting with `ak_` are treated as API keys, anything else as a JWT.
pub async fn extract_user_dual_auth(
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<AuthenticatedUser, ApiError> {
    let api_key_header = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if let Some(api_key) = api_key_header {
        tracing::debug!("Attempting API key authentication");
        let user_id = verify_api_key(api_key.trim(), state.store.as_ref()).await?;
        return Ok(AuthenticatedUser {
            user_id,
            method: AuthMethod::ApiKey,
        });
    }

    let auth = auth.ok_or(ApiError::Unauthorized)?;
    let token = auth.token();

    if token.starts_with(API_KEY_PREFIX) {
        tracing::debug!("Attempting API key authentication via Bearer");
        let user_id = verify_api_key(token, state.store.as_ref()).await?;
        return Ok(AuthenticatedUser {
            user_id,
            method: AuthMethod::ApiKey,
        });
    }

    let claims = verify_token(
        token,
        state.config.auth.jwt_secret.expose_secret().as_bytes(),
    )?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(AuthenticatedUser {
        user_id,
        method: AuthMethod::Jwt,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let caller = extract_user_dual_auth(auth, &parts.headers, state).await?;
        tracing::debug!(
            "Authenticated user {} via {:?} on {}",
            caller.user_id,
            caller.method,
            parts.uri.path()
        );
        Ok(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret-value";

    #[test]
    fn test_generated_keys_have_expected_format() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(key.len(), 35);
        assert!(is_api_key_format(&key));
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn test_hash_api_key_is_stable_hex() {
        let hash = hash_api_key("ak_example");
        assert_eq!(hash, hash_api_key("ak_example"));
        assert_ne!(hash, hash_api_key("ak_other"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("ak_ABCDEFGHijklmnop"), "ak_ABCDEFGH");
        assert!(!is_api_key_format("ak_short"));
        assert!(!is_api_key_format("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, 3600).unwrap();
        assert!(matches!(
            verify_token(&token, b"another-secret-value"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_malformed_password_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
