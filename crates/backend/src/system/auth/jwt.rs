use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::{TokenClaims, UserRole};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Generate JWT access token with 24 hours lifetime
///
/// Токены выдаёт сервис входа; здесь - для служебных клиентов и тестов.
pub fn generate_access_token(
    user_id: &str,
    username: &str,
    role: UserRole,
    secret: &str,
) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Validate JWT token and extract claims
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_and_wrong_secret() {
        let token = generate_access_token("u-1", "gudang", UserRole::Warehouse, "s3cret").unwrap();

        let claims = validate_token(&token, "s3cret").unwrap();
        assert_eq!(claims.username, "gudang");
        assert_eq!(claims.role, UserRole::Warehouse);

        assert!(validate_token(&token, "other").is_err());
        assert!(validate_token("not-a-jwt", "s3cret").is_err());
    }
}
