use curtain_common::database;

use crate::domain::{create_table_ddl, service_tables};
use crate::infrastructure::settings::Settings;

pub mod domain;
pub mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let database = database::connect(&settings.database).await?;
    println!("Connected to DB");

    // migrate database schema for the scheduling tables
    let ddls: Vec<String> = service_tables().iter().map(create_table_ddl).collect();
    database.execute_in_transaction(ddls, "CREATE TABLE").await?;
    println!("Schema migrated");

    Ok(())
}
