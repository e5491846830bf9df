//! Database handle and storage thread

use crate::aof::{replay_entries, AofConfig, AofEntry, AofReader, AofWriter, Journal};
use crate::error::{Result, StoreError};
use crate::model::{Client, NewClient};
use crate::schema::ClientRow;
use crate::store::{ClientTable, TableStats};
use anyhow::Context;
use std::fs::OpenOptions;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// A request sent to the storage thread
enum Request {
    Insert {
        client: NewClient,
        reply: oneshot::Sender<Result<Client>>,
    },
    SelectByCpf {
        cpf: String,
        reply: oneshot::Sender<Option<Client>>,
    },
    Stats {
        reply: oneshot::Sender<TableStats>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the storage thread
///
/// Every method fails with `StorageUnavailable` once the thread has stopped.
pub struct Database {
    request_tx: mpsc::UnboundedSender<Request>,
}

impl Database {
    /// Open the database described by `config`
    ///
    /// Replays the existing AOF, if any, and cuts off a damaged tail so new
    /// entries are appended right after the last intact one.
    pub fn open(config: &AofConfig) -> anyhow::Result<Self> {
        let mut table = ClientTable::new();

        if !config.enabled {
            info!("AOF disabled, client records are kept in memory only");
            return Self::start(table, None);
        }

        let path = &config.path;
        if path.exists() {
            info!("Loading AOF from {}", path.display());
            let reader = AofReader::load(path)
                .with_context(|| format!("failed to read AOF at {}", path.display()))?;
            let parsed = reader.parse_entries();

            if parsed.corrupted {
                warn!(
                    "Truncating AOF {} from {} to {} bytes",
                    path.display(),
                    reader.size(),
                    parsed.valid_len
                );
                OpenOptions::new()
                    .write(true)
                    .open(path)
                    .and_then(|file| file.set_len(parsed.valid_len))
                    .with_context(|| format!("failed to truncate AOF at {}", path.display()))?;
            }

            let restored = replay_entries(&mut table, parsed.entries);
            info!("Restored {} client records", restored);
        }

        let writer = AofWriter::new(path, config.sync_policy)
            .with_context(|| format!("failed to open AOF writer at {}", path.display()))?;
        info!("AOF writer initialized at {} ({:?})", path.display(), config.sync_policy);

        Self::start(table, Some(Box::new(writer)))
    }

    /// A database with no journal
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::start(ClientTable::new(), None)
    }

    /// Start the storage thread over an existing table and journal
    pub fn start(table: ClientTable, journal: Option<Box<dyn Journal>>) -> anyhow::Result<Self> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("clientstore-storage".to_string())
            .spawn(move || run_storage_loop(table, journal, request_rx))
            .context("failed to spawn storage thread")?;

        Ok(Database { request_tx })
    }

    /// Assign an id to `client`, journal it and make it visible
    pub async fn insert(&self, client: NewClient) -> Result<Client> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Insert { client, reply })?;
        Self::await_reply(rx).await?
    }

    /// Oldest record with exactly this CPF
    pub async fn select_by_cpf(&self, cpf: impl Into<String>) -> Result<Option<Client>> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::SelectByCpf {
            cpf: cpf.into(),
            reply,
        })?;
        Self::await_reply(rx).await
    }

    pub async fn stats(&self) -> Result<TableStats> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Stats { reply })?;
        Self::await_reply(rx).await
    }

    /// Sync the journal and stop the storage thread
    ///
    /// Requests already queued behind the shutdown fail with
    /// `StorageUnavailable`. Calling this on a stopped database is a no-op.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.send(Request::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Whether the storage thread is still accepting requests
    pub fn is_running(&self) -> bool {
        !self.request_tx.is_closed()
    }

    fn send(&self, request: Request) -> Result<()> {
        self.request_tx
            .send(request)
            .map_err(|_| StoreError::unavailable("storage engine is not running"))
    }

    async fn await_reply<T>(rx: oneshot::Receiver<T>) -> Result<T> {
        rx.await
            .map_err(|_| StoreError::unavailable("storage engine stopped before replying"))
    }
}

/// The loop that runs in the storage thread
fn run_storage_loop(
    mut table: ClientTable,
    mut journal: Option<Box<dyn Journal>>,
    mut request_rx: mpsc::UnboundedReceiver<Request>,
) {
    if table.is_empty() {
        info!("Storage engine started with an empty table");
    } else {
        info!("Storage engine started with {} records", table.len());
    }

    while let Some(request) = request_rx.blocking_recv() {
        match request {
            Request::Insert { client, reply } => {
                let result = insert_row(&mut table, journal.as_deref_mut(), client);
                let _ = reply.send(result);
            }

            Request::SelectByCpf { cpf, reply } => {
                let found = table.find_first_by_cpf(&cpf).map(ClientRow::to_client);
                let matches = table.count_by_cpf(&cpf);
                if matches > 1 {
                    debug!("CPF {} matches {} records, returning the oldest", cpf, matches);
                }
                let _ = reply.send(found);
            }

            Request::Stats { reply } => {
                let _ = reply.send(table.stats());
            }

            Request::Shutdown { reply } => {
                if let Some(journal) = journal.as_mut() {
                    if let Err(e) = journal.sync() {
                        error!("Failed to sync AOF on shutdown: {}", e);
                    }
                }
                let _ = reply.send(());
                break;
            }
        }
    }

    info!("Storage engine shutting down");
}

/// Journal first, then publish to the table
///
/// The id is taken from the table only once the row is in it, so a failed
/// append leaves no trace and does not burn an id.
fn insert_row(
    table: &mut ClientTable,
    journal: Option<&mut (dyn Journal + 'static)>,
    client: NewClient,
) -> Result<Client> {
    let row = ClientRow::from_new(table.next_id(), client);

    if let Some(journal) = journal {
        let entry = AofEntry::insert(ClientRow::table().name, row.to_columns());
        if let Err(e) = journal.append(&entry) {
            error!("Failed to append client {} to AOF: {}", row.id, e);
            return Err(StoreError::unavailable(format!("failed to write journal: {}", e)));
        }
    }

    let client = row.to_client();
    table.insert(row).map_err(|e| {
        error!("Journaled row rejected by table: {}", e);
        StoreError::unavailable(e.to_string())
    })?;

    debug!("Inserted client {} (cpf {})", client.id(), client.cpf());
    Ok(client)
}
