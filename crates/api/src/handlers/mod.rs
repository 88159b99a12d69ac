pub mod auth;
pub mod commissions;
