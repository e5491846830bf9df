//! Table and column definitions
//!
//! Describes how clients are laid out once persisted. The domain value in
//! `model` knows nothing about this; `mapping` converts between the two.

mod mapping;

pub use mapping::{ClientRow, MappingError};

/// Type of a stored column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
}

/// A single column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Primary key generated by the store on insert
    pub generated: bool,
    /// Covered by a secondary index
    pub indexed: bool,
}

impl ColumnDef {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        ColumnDef {
            name,
            kind,
            generated: false,
            indexed: false,
        }
    }

    const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// A table definition
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The generated primary key column
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.generated)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

pub const COL_ID: &str = "id";
pub const COL_CPF: &str = "cpf";
pub const COL_NOME: &str = "nome";
pub const COL_IDADE: &str = "idade";

/// The `clients` table: keyed by `id`, secondary index on `cpf`
pub const CLIENTS: TableDef = TableDef {
    name: "clients",
    columns: &[
        ColumnDef::new(COL_ID, ColumnKind::Integer).generated(),
        ColumnDef::new(COL_CPF, ColumnKind::Text).indexed(),
        ColumnDef::new(COL_NOME, ColumnKind::Text),
        ColumnDef::new(COL_IDADE, ColumnKind::Integer),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_layout() {
        assert_eq!(CLIENTS.width(), 4);
        assert_eq!(CLIENTS.primary_key().map(|c| c.name), Some(COL_ID));
        assert_eq!(CLIENTS.column_index(COL_CPF), Some(1));
        assert!(CLIENTS.columns[1].indexed);
        assert_eq!(CLIENTS.column_index("email"), None);
    }
}
