//! AOF entry format
//!
//! Binary format: [op_type(u8)] [timestamp(u64)] [table_len(u32)] [table_bytes]
//! [column_count(u32)] ([column_len(u32)] [column_bytes])* [checksum(u64)]

use bytes::Bytes;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Minimum: 1 (op) + 8 (ts) + 4 (table_len) + 4 (column_count) + 8 (checksum)
const MIN_ENTRY_LEN: usize = 25;

/// AOF operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AofOperation {
    /// Row insert
    Insert = 1,
}

impl AofOperation {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AofOperation::Insert),
            _ => None,
        }
    }
}

/// Decoding failure for a single entry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AofError {
    #[error("insufficient data: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("invalid operation type {0}")]
    InvalidOperation(u8),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u64, actual: u64 },
}

/// AOF entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AofEntry {
    /// Operation type
    pub op: AofOperation,
    /// Timestamp (milliseconds since UNIX epoch)
    pub timestamp: u64,
    /// Target table
    pub table: Bytes,
    /// Column values in table order
    pub columns: Vec<Bytes>,
}

impl AofEntry {
    /// Create a new AOF entry stamped with the current time
    pub fn new(op: AofOperation, table: impl Into<Bytes>, columns: Vec<Bytes>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        AofEntry {
            op,
            timestamp,
            table: table.into(),
            columns,
        }
    }

    /// Shorthand for an insert entry
    pub fn insert(table: &'static str, columns: Vec<Bytes>) -> Self {
        Self::new(AofOperation::Insert, Bytes::from_static(table.as_bytes()), columns)
    }

    /// Serialize to bytes with checksum
    pub fn to_bytes(&self) -> Vec<u8> {
        let columns_len: usize = self.columns.iter().map(|c| 4 + c.len()).sum();
        let mut buf = Vec::with_capacity(MIN_ENTRY_LEN + self.table.len() + columns_len);

        buf.push(self.op as u8);
        buf.extend_from_slice(&self.timestamp.to_le_bytes());

        buf.extend_from_slice(&(self.table.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.table);

        buf.extend_from_slice(&(self.columns.len() as u32).to_le_bytes());
        for column in &self.columns {
            buf.extend_from_slice(&(column.len() as u32).to_le_bytes());
            buf.extend_from_slice(column);
        }

        // xxhash64 of all previous bytes
        let checksum = xxhash_rust::xxh64::xxh64(&buf, 0);
        buf.extend_from_slice(&checksum.to_le_bytes());

        buf
    }

    /// Deserialize from bytes with checksum verification
    ///
    /// Returns the entry and the number of bytes it occupied.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), AofError> {
        if data.len() < MIN_ENTRY_LEN {
            return Err(AofError::Truncated {
                needed: MIN_ENTRY_LEN,
                available: data.len(),
            });
        }

        let mut cursor = Cursor { data, pos: 0 };

        let op_byte = cursor.take(1)?[0];
        let op = AofOperation::from_u8(op_byte).ok_or(AofError::InvalidOperation(op_byte))?;
        let timestamp = cursor.read_u64()?;

        let table_len = cursor.read_u32()? as usize;
        let table = Bytes::copy_from_slice(cursor.take(table_len)?);

        let column_count = cursor.read_u32()? as usize;
        let mut columns = Vec::with_capacity(column_count.min(64));
        for _ in 0..column_count {
            let len = cursor.read_u32()? as usize;
            columns.push(Bytes::copy_from_slice(cursor.take(len)?));
        }

        let body_end = cursor.pos;
        let stored_checksum = cursor.read_u64()?;
        let calculated_checksum = xxhash_rust::xxh64::xxh64(&data[..body_end], 0);
        if stored_checksum != calculated_checksum {
            return Err(AofError::ChecksumMismatch {
                expected: stored_checksum,
                actual: calculated_checksum,
            });
        }

        Ok((
            AofEntry {
                op,
                timestamp,
                table,
                columns,
            },
            cursor.pos,
        ))
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], AofError> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(AofError::Truncated {
                needed: self.pos.saturating_add(len),
                available: self.data.len(),
            }),
        }
    }

    fn read_u32(&mut self) -> Result<u32, AofError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn read_u64(&mut self) -> Result<u64, AofError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AofEntry {
        AofEntry::insert(
            "clients",
            vec![
                Bytes::from("1"),
                Bytes::from("12345678901"),
                Bytes::from("Ana"),
                Bytes::from("30"),
            ],
        )
    }

    #[test]
    fn test_serialize_deserialize_insert() {
        let entry = sample();
        let bytes = entry.to_bytes();
        let (decoded, size) = AofEntry::from_bytes(&bytes).unwrap();

        assert_eq!(size, bytes.len());
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_trailing_data_is_not_consumed() {
        let mut bytes = sample().to_bytes();
        let len = bytes.len();
        bytes.extend_from_slice(&[0xAB; 10]);

        let (_, size) = AofEntry::from_bytes(&bytes).unwrap();
        assert_eq!(size, len);
    }

    #[test]
    fn test_checksum_validation() {
        let mut bytes = sample().to_bytes();

        // Corrupt the checksum
        let len = bytes.len();
        bytes[len - 1] ^= 0xFF;

        let result = AofEntry::from_bytes(&bytes);
        assert!(matches!(result, Err(AofError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_truncated_entry() {
        let bytes = sample().to_bytes();
        let result = AofEntry::from_bytes(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(AofError::Truncated { .. })));
    }

    #[test]
    fn test_invalid_operation() {
        let mut bytes = sample().to_bytes();
        bytes[0] = 42;
        assert_eq!(
            AofEntry::from_bytes(&bytes).unwrap_err(),
            AofError::InvalidOperation(42)
        );
    }
}
