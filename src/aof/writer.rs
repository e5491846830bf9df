//! AOF writer
//!
//! Handles writing operations to the AOF file.

use super::{AofEntry, Journal, SyncPolicy};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// File operations the writer needs beyond `Write`
pub trait LogFile: Write + Send {
    /// Current length in bytes
    fn size(&self) -> io::Result<u64>;

    /// Cut the file down to `len` bytes
    fn set_len(&self, len: u64) -> io::Result<()>;

    /// Flush file contents to disk
    fn sync_data(&self) -> io::Result<()>;
}

impl LogFile for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// AOF writer
///
/// Tracks the length of the file up to the last fully written entry so a
/// failed append can be cut back off. If that cut fails the writer refuses
/// every later append: anything written behind the damaged bytes would be
/// dropped by the next replay.
pub struct AofWriter<F = File> {
    file: F,
    sync_policy: SyncPolicy,
    last_sync: Instant,
    committed_len: u64,
    poisoned: bool,
}

impl AofWriter<File> {
    /// Open (or create) the AOF for appending
    pub fn new<P: AsRef<Path>>(path: P, sync_policy: SyncPolicy) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Self::from_file(file, sync_policy)
    }
}

impl<F: LogFile> AofWriter<F> {
    /// Wrap an already opened log positioned at its end
    pub fn from_file(file: F, sync_policy: SyncPolicy) -> io::Result<Self> {
        let committed_len = file.size()?;

        Ok(AofWriter {
            file,
            sync_policy,
            last_sync: Instant::now(),
            committed_len,
            poisoned: false,
        })
    }

    /// Write an entry to the AOF
    pub fn write(&mut self, entry: &AofEntry) -> io::Result<()> {
        if self.is_poisoned() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "AOF writer disabled: a failed write could not be rolled back",
            ));
        }

        let bytes = entry.to_bytes();

        if let Err(e) = self.write_and_sync(&bytes) {
            self.rollback();
            return Err(e);
        }

        self.committed_len += bytes.len() as u64;
        Ok(())
    }

    fn write_and_sync(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;

        match self.sync_policy {
            SyncPolicy::Always => {
                self.file.sync_data()?;
            }
            SyncPolicy::EverySecond => {
                if self.last_sync.elapsed() >= Duration::from_secs(1) {
                    self.file.sync_data()?;
                    self.last_sync = Instant::now();
                }
            }
            SyncPolicy::No => {}
        }

        Ok(())
    }

    /// Cut off whatever part of a failed entry reached the file
    fn rollback(&mut self) {
        match self.file.set_len(self.committed_len) {
            Ok(()) => warn!("AOF rolled back to {} bytes after failed write", self.committed_len),
            Err(e) => {
                error!(
                    "Failed to roll back AOF to {} bytes: {}. Refusing further writes",
                    self.committed_len, e
                );
                self.poisoned = true;
            }
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.last_sync = Instant::now();
        Ok(())
    }

    /// Bytes belonging to fully written entries
    pub fn committed_len(&self) -> u64 {
        self.committed_len
    }

    /// Whether a failed rollback has disabled the writer
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

impl<F: LogFile> Journal for AofWriter<F> {
    fn append(&mut self, entry: &AofEntry) -> io::Result<()> {
        self.write(entry)
    }

    fn sync(&mut self) -> io::Result<()> {
        AofWriter::sync(self)
    }
}
