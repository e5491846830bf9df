//! Create and lookup of clients

use crate::engine::Database;
use crate::error::{Result, StoreError};
use crate::model::{Client, NewClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client store
///
/// Cheap to clone; every clone talks to the same storage engine. No call is
/// retried: a failed create is reported as-is, since CPF uniqueness is not
/// enforced and a blind retry could store the record twice.
#[derive(Clone)]
pub struct ClientStore {
    db: Arc<Database>,
}

impl ClientStore {
    pub fn new(db: Arc<Database>) -> Self {
        ClientStore { db }
    }

    /// Persist a new client and return it with its assigned id
    ///
    /// The CPF must be non-blank. Records sharing a CPF are accepted.
    pub async fn create(&self, client: NewClient) -> Result<Client> {
        validate(&client)?;

        let created = self.db.insert(client).await.inspect_err(|e| {
            warn!("Create failed: {}", e);
        })?;

        info!("Client {} created", created.id());
        Ok(created)
    }

    /// Look up a client by exact CPF
    ///
    /// When several records share the CPF, the one created first is returned.
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>> {
        let found = self.db.select_by_cpf(cpf).await?;
        debug!("Lookup for cpf {}: {}", cpf, if found.is_some() { "hit" } else { "miss" });
        Ok(found)
    }

    /// The underlying storage engine
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

fn validate(client: &NewClient) -> Result<()> {
    if client.cpf.trim().is_empty() {
        return Err(StoreError::invalid("cpf is required"));
    }
    Ok(())
}
