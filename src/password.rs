//! This file defines types that handle password validation and hashing.
//! `ValidatedPassword` wraps a string and ensures it is not blank and fits
//! within bcrypt's input limit.
//! `PasswordHash` converts a `ValidatedPassword` into a salted and hashed password.

use std::fmt::Display;

use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The longest password in bytes that bcrypt hashes without truncating it.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::MissingField] if the password is empty or only whitespace,
    /// - [Error::PasswordTooLong] if the password is longer than [MAX_PASSWORD_BYTES].
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        if raw_password_string.trim().is_empty() {
            return Err(Error::MissingField("password"));
        }

        if raw_password_string.len() > MAX_PASSWORD_BYTES {
            return Err(Error::PasswordTooLong);
        }

        Ok(Self(raw_password_string.to_string()))
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid password is provided it may cause incorrect behaviour but will not affect memory safety.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_string())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// A value of at least 12 is recommended. Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        match non_truncating_hash(&password.0, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Try to create a password hash from a raw password string.
    ///
    /// This is a convenience function that removes the need to manually create
    /// the intermediate `ValidatedPassword` type.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated_password, cost)
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// A password too long to have been hashed never matches.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        match non_truncating_verify(raw_password, &self.0) {
            Err(BcryptError::Truncation(_)) => Ok(false),
            result => result,
        }
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::password::{MAX_PASSWORD_BYTES, PasswordHash, ValidatedPassword};

    #[test]
    fn verify_password_succeeds_for_valid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "okon";

        assert!(hash.verify(password).unwrap());
    }

    #[test]
    fn verify_password_fails_for_invalid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "thewrongpassword";

        assert!(!hash.verify(password).unwrap());
    }

    #[test]
    fn hash_is_salted() {
        let password = ValidatedPassword::new_unchecked("hunter2");

        let first = PasswordHash::new(password.clone(), 4).unwrap();
        let second = PasswordHash::new(password, 4).unwrap();

        assert_ne!(first, second);
        assert!(first.verify("hunter2").unwrap());
        assert!(second.verify("hunter2").unwrap());
    }

    #[test]
    fn verify_rejects_passwords_sharing_a_long_prefix() {
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked(&prefix), 4).unwrap();

        assert!(hash.verify(&prefix).unwrap());
        assert!(!hash.verify(&format!("{prefix}different")).unwrap());
    }
}
