//! Defines the claims carried by bearer tokens and how to sign and verify them.

use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// The default lifetime of a token.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::minutes(15);

/// The keys used to sign and verify tokens, derived from a shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Create the signing and verification keys from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// The ID of the authenticated user.
    pub fn user_id(&self) -> UserID {
        self.sub
    }
}

/// Create a signed token for `user_id` that expires `duration` after `issued_at`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the expiry is not a representable date
/// or the token could not be signed.
pub fn encode_token(
    user_id: UserID,
    issued_at: OffsetDateTime,
    duration: Duration,
    keys: &JwtKeys,
) -> Result<String, Error> {
    let expires_at = issued_at
        .checked_add(duration)
        .ok_or_else(|| Error::TokenCreation("the token expiry is out of range".to_owned()))?;

    let claims = Claims {
        sub: user_id,
        iat: issued_at.unix_timestamp(),
        exp: expires_at.unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, was signed with a
/// different key or has expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            Error::InvalidToken
        })
}
