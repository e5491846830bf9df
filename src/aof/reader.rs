//! AOF reader
//!
//! Handles reading operations back from the AOF file.

use super::AofEntry;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// AOF reader
pub struct AofReader {
    data: Vec<u8>,
}

/// Entries recovered from an AOF
#[derive(Debug, Default)]
pub struct ParsedEntries {
    pub entries: Vec<AofEntry>,
    /// Length of the intact prefix of the file
    pub valid_len: u64,
    /// Whether parsing stopped on a corrupt or partial entry
    pub corrupted: bool,
}

impl AofReader {
    /// Load AOF file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read(path)?;
        Ok(AofReader { data })
    }

    /// Build a reader over bytes already in memory
    pub fn from_bytes(data: Vec<u8>) -> Self {
        AofReader { data }
    }

    /// Parse all entries from the AOF
    ///
    /// Stops at the first entry that fails to decode. Everything before it is
    /// returned; everything from it on is reported as outside `valid_len`.
    pub fn parse_entries(&self) -> ParsedEntries {
        let mut entries = Vec::new();
        let mut pos = 0;
        let mut corrupted = false;

        while pos < self.data.len() {
            match AofEntry::from_bytes(&self.data[pos..]) {
                Ok((entry, size)) => {
                    entries.push(entry);
                    pos += size;
                }
                Err(e) => {
                    error!("Failed to parse AOF entry at position {}: {}", pos, e);
                    corrupted = true;
                    break;
                }
            }
        }

        if corrupted {
            warn!(
                "AOF parsing stopped early: {} entries recovered, {} trailing bytes unreadable",
                entries.len(),
                self.data.len() - pos
            );
        } else {
            info!("AOF loaded successfully: {} entries", entries.len());
        }

        ParsedEntries {
            entries,
            valid_len: pos as u64,
            corrupted,
        }
    }

    /// Get the total size of the AOF data
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
