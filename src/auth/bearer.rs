//! Extracts and verifies the bearer token on protected routes.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    Error,
    auth::token::{Claims, JwtKeys, decode_token},
};

/// Route handlers that take [Claims] as an argument only run for requests
/// with a valid, unexpired bearer token. Other requests are rejected with
/// [Error::MissingToken] or [Error::InvalidToken] (401 Unauthorized) before
/// the handler is called.
impl<S> FromRequestParts<S> for Claims
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingToken
                } else {
                    Error::InvalidToken
                }
            })?;

        let keys = JwtKeys::from_ref(state);

        decode_token(bearer.token(), &keys)
    }
}
