pub mod auth;
pub mod farm;
pub mod hajj;
pub mod office;
pub mod reports;
pub mod ticketing;
