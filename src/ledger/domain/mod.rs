pub mod accounts;
pub mod currency;
pub mod formatting;
pub mod reports;
pub mod transactions;
