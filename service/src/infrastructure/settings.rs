use std::env;

use anyhow::Context;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use curtain_common::database::DatabaseSettings;
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    /// IANA zone naive schedule text is interpreted in, e.g. "Europe/Berlin".
    pub reference_timezone: String,
    /// NOTIFY channel the host's cache layer listens on. Unset disables
    /// purge scheduling entirely.
    pub purge_channel: Option<String>,
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("_"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }

    pub fn reference_timezone(&self) -> anyhow::Result<Tz> {
        self.reference_timezone
            .parse::<Tz>()
            .map_err(|error| anyhow::anyhow!("invalid reference timezone: {error}"))
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
