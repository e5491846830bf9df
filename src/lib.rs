//! clientstore - A durable registry of clients keyed by CPF
//!
//! Layers, from the inside out:
//! - `model`: the domain values
//! - `schema`: table/column definitions and row mapping
//! - `store`: the in-memory table and its CPF index
//! - `aof`: the append-only journal that makes inserts durable
//! - `engine`: the storage thread that owns table and journal
//! - `service`: the create/lookup operations adapters call
//! - `web`: the HTTP adapter

pub mod aof;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod schema;
pub mod service;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use config::Config;
pub use engine::Database;
pub use error::StoreError;
pub use model::{Client, ClientId, NewClient};
pub use service::ClientStore;
