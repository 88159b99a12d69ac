//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table and a
//! create DTO for inserts.

pub mod commission;
pub mod session;
pub mod user;
