use std::sync::Arc;

use curtain_common::database;

use crate::domain::{PurgeTrigger, Reconciler};
use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::persistence::{PostgresJobStore, PostgresPolicyStore};
use crate::infrastructure::purge::PgNotifyPurger;
use crate::infrastructure::scheduler::TokioScheduler;
use crate::infrastructure::settings::Settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let reference_timezone = settings.reference_timezone()?;

    let database = database::connect(&settings.database).await?;
    tracing::info!("connected to database");

    let jobs = PostgresJobStore::new(database);
    let policy_store = PostgresPolicyStore::new(database);
    let purger = settings
        .purge_channel
        .clone()
        .map(|channel| PgNotifyPurger::new(database, channel));
    if purger.is_none() {
        tracing::warn!("no purge channel configured, purge scheduling is inactive");
    }

    let trigger = PurgeTrigger::new(jobs, policy_store, purger.clone());
    let scheduler = TokioScheduler::new(trigger);
    let reconciler = Arc::new(Reconciler::new(
        jobs,
        scheduler,
        policy_store,
        purger,
        reference_timezone,
    ));

    reconciler.restore().await?;

    let state = AppStateImpl::new(reconciler, policy_store, reference_timezone);

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
