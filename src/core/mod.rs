//! Shared building blocks: data model, identity, hashing, persistence.

pub mod error;
pub mod finding;
pub mod group;
pub mod hash;
pub mod ident;
pub mod store;
pub mod time;
