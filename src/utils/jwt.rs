use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 bearer tokens shared with the identity service
pub struct JwtUtil {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_secs: i64,
}

impl JwtUtil {
    pub fn new(secret: &str, expires_in_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_secs: i64::try_from(expires_in_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn generate_token(&self, user_id: i64, username: &str) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now.saturating_add(self.expires_in_secs),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> ApiResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let jwt = JwtUtil::new("test-secret", 3600);
        let token = jwt.generate_token(7, "alice").unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = JwtUtil::new("secret-a", 3600).generate_token(1, "bob").unwrap();
        assert!(JwtUtil::new("secret-b", 3600).verify_token(&token).is_err());
    }
}
