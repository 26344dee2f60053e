//! Accounts, transactions, and the reports derived from them.

pub mod domain;
pub mod http;
pub mod services;
