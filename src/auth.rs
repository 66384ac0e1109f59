//! Identity extraction. Login, registration and password handling live in an
//! external identity service; this crate only validates the bearer tokens it
//! issues and exposes the claims to handlers.

use crate::error::AppError;
use crate::models::Role;
use axum::{
    async_trait,
    extract::{FromRequest, RequestParts, TypedHeader},
    headers::{authorization::Bearer, Authorization},
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::{ops::Deref, time::Duration};

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

lazy_static::lazy_static! {
    static ref KEYS: Keys = {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        Keys {
            encoding: EncodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
            decoding: DecodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
        }
    };
}

/// The authenticated principal, as asserted by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub role: Role,
    pub email: String,
    pub division: Option<String>,
    pub department: Option<String>,
    pub exp: u64,
}

#[allow(unused_must_use)]
pub fn ensure_jwt_secret_is_valid() {
    KEYS.deref();
}

pub fn generate_jwt(
    sub: i32,
    role: Role,
    email: &str,
    division: Option<String>,
    department: Option<String>,
    exp: Duration,
) -> JwtResult<String> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims {
            sub,
            role,
            email: email.to_string(),
            division,
            department,
            exp: jsonwebtoken::get_current_timestamp() + exp.as_secs(),
        },
        &KEYS.encoding,
    )
}

pub fn validate_jwt(token: &str) -> JwtResult<TokenData<Claims>> {
    jsonwebtoken::decode::<Claims>(token, &KEYS.decoding, &Validation::default())
}

/// Extractor pulling `Claims` out of the `Authorization: Bearer` header.
pub struct ExtractAuth(pub Claims);

#[async_trait]
impl<B: Send> FromRequest<B> for ExtractAuth {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request(req)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let token = validate_jwt(bearer.token()).map_err(|_| AppError::Unauthorized)?;
        Ok(ExtractAuth(token.claims))
    }
}
