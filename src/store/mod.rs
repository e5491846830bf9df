//! In-memory table module
//!
//! Holds the rows of the `clients` table and its CPF index. This module is
//! independent of durability and transport; the engine decides when a row
//! may be added.

mod table;

pub use table::{ClientTable, TableError, TableStats};
