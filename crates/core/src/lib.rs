//! ArtTrack domain logic.
//!
//! Everything here is free of database and HTTP dependencies: the status
//! pipeline, the commission record model, visibility rules, the session gate
//! and the optimistic mutation machinery. Persistence and identity are
//! reached through the collaborator traits in [`store`] and [`identity`].

pub mod commission;
pub mod commission_types;
pub mod dashboard;
pub mod delete_confirm;
pub mod error;
pub mod identity;
pub mod local_identity;
pub mod local_store;
pub mod mutation;
pub mod optimistic;
pub mod seed;
pub mod session;
pub mod status;
pub mod store;
pub mod types;
pub mod visibility;
