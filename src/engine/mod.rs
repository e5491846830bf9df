//! Storage engine
//!
//! The backing medium for client records. A dedicated thread owns the table
//! and the journal and applies requests one at a time; callers talk to it
//! through a [`Database`] handle, which holds nothing but the channel.

mod database;

pub use database::Database;
