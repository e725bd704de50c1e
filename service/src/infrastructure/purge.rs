use anyhow::Context;

use curtain_common::database::Database;

use crate::domain::CachePurger;

/// Cache purge collaborator signalling over Postgres NOTIFY.
///
/// The host's page-cache layer LISTENs on the configured channel and flushes
/// everything when a notification arrives. Constructed only when a channel is
/// configured; otherwise the service runs without a purge collaborator and
/// reconciliation degrades to cancel-only.
#[derive(Clone)]
pub struct PgNotifyPurger {
    database: &'static Database,
    channel: String,
}

pub const PURGE_PAYLOAD: &str = "purge-all";

impl PgNotifyPurger {
    pub fn new(database: &'static Database, channel: String) -> Self {
        Self { database, channel }
    }
}

impl CachePurger for PgNotifyPurger {
    async fn purge_all(&self) -> Result<(), anyhow::Error> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(PURGE_PAYLOAD)
            .execute(self.database.database_pool())
            .await
            .with_context(|| format!("failed to notify purge channel {}", self.channel))?;
        Ok(())
    }
}
