use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::SaltString;
use rand_core::OsRng;

use super::Password;

/// An argon2 hash of a password, held in its PHC string form.
#[derive(Clone, Debug)]
pub struct Hash(String);

impl Hash {
    /// Hash a password with a freshly generated salt.
    pub fn new(password: &Password) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), salt.as_ref())?
            .to_string();

        Ok(Self(password_hash))
    }

    /// Determine if the hash value matches a raw password.
    ///
    /// # Returns
    ///
    /// `Ok(false)` for a wrong password. An [`Err`] means the comparison
    /// itself could not be made.
    pub fn matches_raw_password(&self, raw_password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&self.0)?;

        match Argon2::default().verify_password(raw_password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }
}
