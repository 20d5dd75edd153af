use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

/// Claims carried by the store's access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub aud: Option<String>,
    pub exp: u64,
    pub iat: Option<u64>,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// The token is kept around for the store calls that act on the session
/// itself (logout, session lookup).
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token: String,
}

pub fn decode_user_id(token: &str, secret: &str) -> Result<Uuid, String> {
    // Audience is left unchecked; the sub claim is what we key on.
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| format!("token rejected: {}", e))?;

    Uuid::parse_str(&data.claims.sub).map_err(|e| format!("invalid subject: {}", e))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = match req.headers().get("Authorization").and_then(|h| h.to_str().ok()) {
            Some(h) => h,
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        if !header.starts_with("Bearer ") {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        }
        let token = header.trim_start_matches("Bearer ").trim();

        let Some(config) = req.app_data::<web::Data<AppConfig>>() else {
            return ready(Err(ErrorUnauthorized("Auth not configured")));
        };

        match decode_user_id(token, &config.supabase_jwt_secret) {
            Ok(user_id) => ready(Ok(AuthenticatedUser {
                user_id,
                token: token.to_string(),
            })),
            Err(e) => {
                log::debug!("auth rejected: {}", e);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn mint(sub: &str, secret: &str, exp: u64) -> String {
        let claims = JwtClaims {
            sub: sub.to_string(),
            aud: Some("authenticated".to_string()),
            exp,
            iat: None,
            role: Some("authenticated".to_string()),
            email: None,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap()
    }

    fn far_future() -> u64 {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn valid_token_yields_the_subject() {
        let id = Uuid::new_v4();
        let token = mint(&id.to_string(), "secret", far_future());
        assert_eq!(decode_user_id(&token, "secret"), Ok(id));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint(&Uuid::new_v4().to_string(), "secret", far_future());
        assert!(decode_user_id(&token, "other").is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let token = mint("service-account", "secret", far_future());
        assert!(decode_user_id(&token, "secret").is_err());
    }
}
