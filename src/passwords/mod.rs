//! Hashing and validating passwords.
mod hash;
mod password;

pub use hash::Hash;
pub use password::Password;
