use chrono::{Duration, Utc};
use domain::{OwnerId, Session, SessionError, SessionResolver};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザー ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 で署名されたセッショントークンを扱う
pub struct JwtSessionResolver {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionResolver {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// 指定ユーザーのセッショントークンを発行
    pub fn issue(
        &self,
        user_id: &OwnerId,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }
}

impl SessionResolver for JwtSessionResolver {
    fn resolve(&self, token: &str) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::ExpiredSession,
                _ => SessionError::InvalidSession(e.to_string()),
            }
        })?;

        let user_id = OwnerId::from_string(data.claims.sub)
            .map_err(|e| SessionError::InvalidSession(e.to_string()))?;

        Ok(Session { user_id })
    }
}
