//! Clients table with a secondary index on CPF

use crate::model::ClientId;
use crate::schema::ClientRow;
use siphasher::sip::SipHasher13;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasherDefault;
use thiserror::Error;

/// CPF -> ids in insertion order
type CpfIndex = HashMap<String, Vec<ClientId>, BuildHasherDefault<SipHasher13>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("row with id {0} already exists")]
    DuplicateId(ClientId),

    #[error("id {0} leaves no id for the next row")]
    IdExhausted(ClientId),
}

/// Rows keyed by surrogate id
///
/// Rows are only ever added. The index keeps the ids for each CPF in the
/// order they were inserted, so the first one is the oldest record.
pub struct ClientTable {
    rows: BTreeMap<ClientId, ClientRow>,
    cpf_index: CpfIndex,
    next_id: ClientId,
}

impl ClientTable {
    pub fn new() -> Self {
        ClientTable {
            rows: BTreeMap::new(),
            cpf_index: CpfIndex::default(),
            next_id: ClientId::FIRST,
        }
    }

    /// Id the next inserted row will receive
    pub fn next_id(&self) -> ClientId {
        self.next_id
    }

    /// Add a row and index it
    ///
    /// Advances `next_id` past the row's id, so replayed rows and freshly
    /// assigned ones never collide.
    pub fn insert(&mut self, row: ClientRow) -> Result<(), TableError> {
        if self.rows.contains_key(&row.id) {
            return Err(TableError::DuplicateId(row.id));
        }
        let after = row.id.next().ok_or(TableError::IdExhausted(row.id))?;

        let id = row.id;
        let ids = self.cpf_index.entry(row.cpf.clone()).or_default();
        ids.push(id);
        // keep the list ordered if replay ever feeds ids out of order
        if ids.len() > 1 && ids[ids.len() - 2] > id {
            ids.sort_unstable();
        }

        self.rows.insert(id, row);
        if after > self.next_id {
            self.next_id = after;
        }

        Ok(())
    }

    /// Oldest row with exactly this CPF
    pub fn find_first_by_cpf(&self, cpf: &str) -> Option<&ClientRow> {
        self.cpf_index
            .get(cpf)
            .and_then(|ids| ids.first())
            .and_then(|id| self.rows.get(id))
    }

    /// Number of rows sharing this CPF
    pub fn count_by_cpf(&self, cpf: &str) -> usize {
        self.cpf_index.get(cpf).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            rows: self.rows.len(),
            distinct_cpfs: self.cpf_index.len(),
            next_id: self.next_id.value(),
        }
    }
}

impl Default for ClientTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub rows: usize,
    pub distinct_cpfs: usize,
    pub next_id: u64,
}
