//! Account passwords ([`password`]) and session tokens ([`jwt`]).

pub mod jwt;
pub mod password;
