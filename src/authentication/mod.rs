//! Demo login backed by an encrypted session cookie.

pub mod domain;
pub mod http;
