//! AOF replay
//!
//! Handles replaying AOF entries to reconstruct the clients table.

use super::{AofEntry, AofOperation};
use crate::schema::ClientRow;
use crate::store::ClientTable;
use tracing::{info, warn};

/// Replay AOF entries into a table
///
/// Entries that cannot be applied are logged and skipped. Returns the number
/// of rows restored.
pub fn replay_entries(table: &mut ClientTable, entries: Vec<AofEntry>) -> usize {
    let mut replayed = 0;

    for entry in entries {
        match replay_entry(table, &entry) {
            Ok(()) => replayed += 1,
            Err(e) => {
                warn!("Failed to replay AOF entry: {}. Skipping.", e);
            }
        }
    }

    info!("Successfully replayed {} AOF entries", replayed);
    replayed
}

/// Replay a single AOF entry
fn replay_entry(table: &mut ClientTable, entry: &AofEntry) -> Result<(), String> {
    let expected = ClientRow::table().name;
    if entry.table.as_ref() != expected.as_bytes() {
        return Err(format!(
            "unknown table '{}'",
            String::from_utf8_lossy(&entry.table)
        ));
    }

    match entry.op {
        AofOperation::Insert => {
            let row = ClientRow::from_columns(&entry.columns).map_err(|e| e.to_string())?;
            table.insert(row).map_err(|e| e.to_string())
        }
    }
}
