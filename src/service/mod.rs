//! Client store service
//!
//! The two operations transport adapters call: create a client and look one
//! up by CPF. Validation happens here; persistence is delegated to the
//! storage engine.

mod client_store;

pub use client_store::ClientStore;
