//! Bearer token authentication.
//!
//! Tokens are signed JSON Web Tokens that carry the user's ID. Handlers that
//! need an authenticated user take [Claims] as an argument.

mod bearer;
mod token;

pub use token::{Claims, DEFAULT_TOKEN_DURATION, JwtKeys, encode_token};
