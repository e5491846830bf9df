//! In-memory log file with switchable faults

use super::LogFile;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct FaultState {
    data: Vec<u8>,
    /// Bytes still accepted before writes start failing
    write_budget: Option<usize>,
    fail_sync: bool,
    fail_set_len: bool,
}

/// Clones share the same contents and fault switches
#[derive(Clone, Default)]
pub(crate) struct FaultyFile {
    state: Arc<Mutex<FaultState>>,
}

fn fault(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message.to_string())
}

impl FaultyFile {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FaultState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.state().data.clone()
    }

    pub(crate) fn set_write_budget(&self, budget: Option<usize>) {
        self.state().write_budget = budget;
    }

    pub(crate) fn set_fail_sync(&self, fail: bool) {
        self.state().fail_sync = fail;
    }

    pub(crate) fn set_fail_set_len(&self, fail: bool) {
        self.state().fail_set_len = fail;
    }
}

impl Write for FaultyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state();
        let n = match state.write_budget {
            Some(0) => return Err(fault("no space left on device")),
            Some(budget) => budget.min(buf.len()),
            None => buf.len(),
        };
        if let Some(budget) = state.write_budget.as_mut() {
            *budget -= n;
        }
        state.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for FaultyFile {
    fn size(&self) -> io::Result<u64> {
        Ok(self.state().data.len() as u64)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_set_len {
            return Err(fault("truncate failed"));
        }
        state.data.truncate(len as usize);
        Ok(())
    }

    fn sync_data(&self) -> io::Result<()> {
        if self.state().fail_sync {
            return Err(fault("fsync failed"));
        }
        Ok(())
    }
}
