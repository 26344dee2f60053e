pub mod authentication;
pub mod cli;
mod cors;
pub mod http_err;
pub mod ledger;
mod passwords;
pub mod repos;
pub mod server;
