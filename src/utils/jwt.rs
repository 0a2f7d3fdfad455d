use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token accepted by protected endpoints
    Access,
    /// Long-lived token only accepted by `/api/auth/refresh`
    Refresh,
}

/// JWT claims carried by both token types.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// `user` or `admin`
    pub role: String,
    pub token_type: TokenType,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid for `ttl_minutes` from now. A negative TTL yields
    /// an already expired token.
    pub fn new(
        user_id: i32,
        email: impl Into<String>,
        role: impl Into<String>,
        token_type: TokenType,
        ttl_minutes: i64,
    ) -> Self {
        let now = jiff::Timestamp::now().as_second();
        Self {
            sub: user_id.to_string(),
            email: email.into(),
            role: role.into(),
            token_type,
            iat: now,
            exp: now + ttl_minutes * 60,
        }
    }

    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

/// An access/refresh pair as returned by login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

fn algorithm(config: &JwtConfig) -> AppResult<Algorithm> {
    config.algorithm.to_uppercase().parse().map_err(|_| AppError::Configuration {
        key: "jwt.algorithm".to_string(),
        source: anyhow::anyhow!("unsupported algorithm {}", config.algorithm),
    })
}

/// Signs `claims` with the configured secret.
pub fn encode_claims(claims: &Claims, config: &JwtConfig) -> AppResult<String> {
    encode(
        &Header::new(algorithm(config)?),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

pub fn generate_token(
    user_id: i32,
    email: &str,
    role: &str,
    token_type: TokenType,
    config: &JwtConfig,
) -> AppResult<String> {
    let ttl = match token_type {
        TokenType::Access => config.access_token_expiration,
        TokenType::Refresh => config.refresh_token_expiration,
    };
    encode_claims(&Claims::new(user_id, email, role, token_type, ttl), config)
}

pub fn generate_access_token(
    user_id: i32,
    email: &str,
    role: &str,
    config: &JwtConfig,
) -> AppResult<String> {
    generate_token(user_id, email, role, TokenType::Access, config)
}

pub fn generate_refresh_token(
    user_id: i32,
    email: &str,
    role: &str,
    config: &JwtConfig,
) -> AppResult<String> {
    generate_token(user_id, email, role, TokenType::Refresh, config)
}

pub fn generate_token_pair(
    user_id: i32,
    email: &str,
    role: &str,
    config: &JwtConfig,
) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: generate_access_token(user_id, email, role, config)?,
        refresh_token: generate_refresh_token(user_id, email, role, config)?,
        expires_in: config.access_token_expiration * 60,
    })
}

/// Validates signature, expiry (no leeway) and, if given, the token type.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
    expected_type: Option<TokenType>,
) -> AppResult<Claims> {
    let mut validation = Validation::new(algorithm(config)?);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized("Token has expired"),
        ErrorKind::InvalidSignature => AppError::unauthorized("Invalid token signature"),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
            AppError::unauthorized("Invalid token")
        }
        _ => AppError::unauthorized(format!("Token validation failed: {}", e)),
    })?;

    if let Some(expected) = expected_type
        && claims.token_type != expected
    {
        return Err(AppError::unauthorized(format!(
            "Invalid token type: expected {:?}, got {:?}",
            expected, claims.token_type
        )));
    }

    Ok(claims)
}

pub fn validate_access_token(token: &str, config: &JwtConfig) -> AppResult<Claims> {
    validate_token(token, config, Some(TokenType::Access))
}

pub fn validate_refresh_token(token: &str, config: &JwtConfig) -> AppResult<Claims> {
    validate_token(token, config, Some(TokenType::Refresh))
}
