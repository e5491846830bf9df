//! Append-Only File (AOF) persistence module
//!
//! Provides durability by logging every committed insert to disk.
//! Each operation is written in a compact binary format with checksums,
//! and the table is rebuilt by replaying the file at startup.

mod entry;
mod writer;
mod reader;
mod replay;
#[cfg(test)]
pub(crate) mod testing;

pub use entry::{AofEntry, AofError, AofOperation};
pub use writer::{AofWriter, LogFile};
pub use reader::{AofReader, ParsedEntries};
pub use replay::replay_entries;

use serde::Deserialize;
use std::io;
use std::path::PathBuf;

/// AOF sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Sync after every write (safest, slowest)
    #[default]
    Always,
    /// Sync every second (balanced)
    EverySecond,
    /// Let the OS decide when to sync (fastest, least safe)
    No,
}

impl std::str::FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(SyncPolicy::Always),
            "every_second" | "everysec" => Ok(SyncPolicy::EverySecond),
            "no" => Ok(SyncPolicy::No),
            other => Err(format!("unknown sync policy '{}'", other)),
        }
    }
}

/// AOF configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AofConfig {
    /// Path to the AOF file
    pub path: PathBuf,
    /// Sync policy
    pub sync_policy: SyncPolicy,
    /// Whether to enable AOF (disabled means records live in memory only)
    pub enabled: bool,
}

impl Default for AofConfig {
    fn default() -> Self {
        AofConfig {
            path: PathBuf::from("clientstore.aof"),
            sync_policy: SyncPolicy::default(),
            enabled: true,
        }
    }
}

/// Durable sink for committed operations
///
/// `append` either records the whole entry or leaves the journal as it was
/// before the call.
pub trait Journal: Send {
    /// Append an entry, applying the sync policy
    fn append(&mut self, entry: &AofEntry) -> io::Result<()>;

    /// Force everything appended so far to disk
    fn sync(&mut self) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_policy_parse() {
        assert_eq!("always".parse::<SyncPolicy>(), Ok(SyncPolicy::Always));
        assert_eq!("EVERY_SECOND".parse::<SyncPolicy>(), Ok(SyncPolicy::EverySecond));
        assert_eq!("no".parse::<SyncPolicy>(), Ok(SyncPolicy::No));
        assert!("sometimes".parse::<SyncPolicy>().is_err());
    }

    #[test]
    fn test_default_config_is_durable() {
        let config = AofConfig::default();
        assert!(config.enabled);
        assert_eq!(config.sync_policy, SyncPolicy::Always);
    }
}
