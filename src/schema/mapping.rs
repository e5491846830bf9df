//! Mapping between domain values, table rows and journal columns

use super::{ColumnKind, TableDef, CLIENTS, COL_CPF, COL_ID, COL_IDADE, COL_NOME};
use crate::model::{Client, ClientId, NewClient};
use bytes::Bytes;
use thiserror::Error;

/// A row could not be decoded against its table definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("table '{table}' expects {expected} columns, got {actual}")]
    ColumnCount {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' is not valid UTF-8")]
    Encoding(&'static str),

    #[error("column '{column}' is not an integer: '{value}'")]
    NotAnInteger { column: &'static str, value: String },
}

/// A row of the `clients` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRow {
    pub id: ClientId,
    pub cpf: String,
    pub nome: String,
    pub idade: i32,
}

impl ClientRow {
    /// Table this row belongs to
    pub fn table() -> &'static TableDef {
        &CLIENTS
    }

    /// Build the row for a new client under a freshly assigned id
    pub fn from_new(id: ClientId, client: NewClient) -> Self {
        ClientRow {
            id,
            cpf: client.cpf,
            nome: client.name,
            idade: client.age,
        }
    }

    pub fn to_client(&self) -> Client {
        Client::new(self.id, self.cpf.clone(), self.nome.clone(), self.idade)
    }

    /// Column values in table order, as text
    pub fn to_columns(&self) -> Vec<Bytes> {
        CLIENTS
            .columns
            .iter()
            .map(|column| match column.name {
                COL_ID => Bytes::from(self.id.value().to_string()),
                COL_CPF => Bytes::from(self.cpf.clone()),
                COL_NOME => Bytes::from(self.nome.clone()),
                _ => Bytes::from(self.idade.to_string()),
            })
            .collect()
    }

    /// Decode column values written by [`ClientRow::to_columns`]
    pub fn from_columns(columns: &[Bytes]) -> Result<Self, MappingError> {
        if columns.len() != CLIENTS.width() {
            return Err(MappingError::ColumnCount {
                table: CLIENTS.name,
                expected: CLIENTS.width(),
                actual: columns.len(),
            });
        }

        let mut id = 0u64;
        let mut cpf = String::new();
        let mut nome = String::new();
        let mut idade = 0i32;

        for (column, raw) in CLIENTS.columns.iter().zip(columns) {
            let text = std::str::from_utf8(raw).map_err(|_| MappingError::Encoding(column.name))?;

            match (column.name, column.kind) {
                (COL_ID, _) => id = parse_integer(column.name, text)?,
                (COL_IDADE, _) => idade = parse_integer(column.name, text)?,
                (COL_CPF, ColumnKind::Text) => cpf = text.to_string(),
                (COL_NOME, ColumnKind::Text) => nome = text.to_string(),
                _ => {}
            }
        }

        Ok(ClientRow {
            id: ClientId::new(id),
            cpf,
            nome,
            idade,
        })
    }
}

fn parse_integer<T: std::str::FromStr>(column: &'static str, text: &str) -> Result<T, MappingError> {
    text.parse().map_err(|_| MappingError::NotAnInteger {
        column,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientRow {
        ClientRow::from_new(ClientId::new(7), NewClient::new("12345678901", "Ana", 30))
    }

    #[test]
    fn test_columns_follow_table_order() {
        let columns = sample().to_columns();
        assert_eq!(
            columns,
            vec![
                Bytes::from("7"),
                Bytes::from("12345678901"),
                Bytes::from("Ana"),
                Bytes::from("30"),
            ]
        );
        assert_eq!(ClientRow::from_columns(&columns).unwrap(), sample());
    }

    #[test]
    fn test_to_client() {
        let client = sample().to_client();
        assert_eq!(client.id(), ClientId::new(7));
        assert_eq!(client.name(), "Ana");
        assert_eq!(client.age(), 30);
    }

    #[test]
    fn test_wrong_column_count() {
        let err = ClientRow::from_columns(&[Bytes::from("1")]).unwrap_err();
        assert!(matches!(err, MappingError::ColumnCount { expected: 4, actual: 1, .. }));
    }

    #[test]
    fn test_non_integer_age() {
        let columns = vec![
            Bytes::from("1"),
            Bytes::from("111"),
            Bytes::from("A"),
            Bytes::from("twenty"),
        ];
        let err = ClientRow::from_columns(&columns).unwrap_err();
        assert_eq!(
            err,
            MappingError::NotAnInteger {
                column: COL_IDADE,
                value: "twenty".to_string()
            }
        );
    }

    #[test]
    fn test_negative_age_is_kept() {
        let row = ClientRow::from_new(ClientId::new(1), NewClient::new("1", "x", -4));
        assert_eq!(ClientRow::from_columns(&row.to_columns()).unwrap().idade, -4);
    }
}
