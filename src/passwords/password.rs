use std::fmt::Debug;

use semval::prelude::*;
use thiserror::Error;

const MAX_PASSWORD_LENGTH: usize = 512;
const MIN_PASSWORD_LENGTH: usize = 8;

/// A password that can be hashed for later comparison.
pub struct Password(String);

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum PasswordInvalidity {
    #[error("passwords may not be longer than {0} characters")]
    MaxLength(usize),
    #[error("passwords must contain at least {0} characters")]
    MinLength(usize),
}

impl Password {
    /// Validate a raw password, reporting the first rule it breaks.
    pub fn parse(raw: &str) -> Result<Self, PasswordInvalidity> {
        Self::validated_from(raw).map_err(|(_, context)| {
            context
                .into_iter()
                .next()
                .unwrap_or(PasswordInvalidity::MinLength(MIN_PASSWORD_LENGTH))
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Validate for Password {
    type Invalidity = PasswordInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.0.len() < MIN_PASSWORD_LENGTH,
                PasswordInvalidity::MinLength(MIN_PASSWORD_LENGTH),
            )
            .invalidate_if(
                self.0.len() > MAX_PASSWORD_LENGTH,
                PasswordInvalidity::MaxLength(MAX_PASSWORD_LENGTH),
            )
            .into()
    }
}

impl ValidatedFrom<&str> for Password {
    fn validated_from(from: &str) -> ValidatedResult<Self> {
        let into = Password(from.to_owned());

        match into.validate() {
            Ok(_) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"*".repeat(8)).finish()
    }
}
