//! Domain values
//!
//! Plain data with no knowledge of how it is stored or transported.

mod client;

pub use client::{Client, ClientId, NewClient};
