use std::fmt::Debug;

use anyhow::Context;
use semval::prelude::*;
use serde::Deserialize;

use crate::passwords::{self, Password};

/// Longest password accepted by the login form.
const MAX_PASSWORD_LENGTH: usize = 512;

/// The raw body of a login request.
#[derive(Deserialize)]
pub struct EmailPasswordPair {
    pub email: String,
    pub password: String,
}

/// Login credentials that have passed basic shape checks.
pub struct Credentials {
    email: String,
    password: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CredentialsInvalidity {
    EmptyEmail,
    /// The email address has no `@`.
    MalformedEmail,
    EmptyPassword,
    PasswordTooLong(usize),
}

impl Credentials {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Validate for Credentials {
    type Invalidity = CredentialsInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(self.email.is_empty(), CredentialsInvalidity::EmptyEmail)
            .invalidate_if(
                !self.email.is_empty() && !self.email.contains('@'),
                CredentialsInvalidity::MalformedEmail,
            )
            .invalidate_if(self.password.is_empty(), CredentialsInvalidity::EmptyPassword)
            .invalidate_if(
                self.password.len() > MAX_PASSWORD_LENGTH,
                CredentialsInvalidity::PasswordTooLong(MAX_PASSWORD_LENGTH),
            )
            .into()
    }
}

impl ValidatedFrom<EmailPasswordPair> for Credentials {
    fn validated_from(from: EmailPasswordPair) -> ValidatedResult<Self> {
        let into = Credentials {
            email: from.email.trim().to_owned(),
            password: from.password,
        };

        match into.validate() {
            Ok(_) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"*".repeat(8))
            .finish()
    }
}

/// The only account that can log in to the dashboard.
#[derive(Clone, Debug)]
pub struct DemoAccount {
    email: String,
    name: String,
    password_hash: passwords::Hash,
}

impl DemoAccount {
    /// Create the demo account, hashing its password.
    ///
    /// The password must satisfy the usual password rules.
    pub fn new(email: &str, name: &str, password: &str) -> anyhow::Result<Self> {
        let password = Password::parse(password).context("Invalid demo account password.")?;

        Ok(Self {
            email: email.trim().to_owned(),
            name: name.to_owned(),
            password_hash: passwords::Hash::new(&password)?,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Determine if the credentials belong to this account.
    ///
    /// Emails are compared without regard to case.
    pub fn accepts(&self, credentials: &Credentials) -> anyhow::Result<bool> {
        if !self.email.eq_ignore_ascii_case(credentials.email()) {
            return Ok(false);
        }

        self.password_hash.matches_raw_password(credentials.password())
    }
}
