//! ArtTrack API server library.
//!
//! Exposes config, state, error handling, auth and routes so integration
//! tests and the binary entrypoint can both build the same router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
