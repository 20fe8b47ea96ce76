//! Runtime settings for the simulated ledger.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! then `RFQ_LEDGER_*` environment variables (`RFQ_LEDGER_WRITE_LATENCY_MS=250`).

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

use crate::ledger::mock::{
    SimulationProfile, DEFAULT_DEADLINE_DAYS, DEFAULT_READ_LATENCY, DEFAULT_WRITE_LATENCY,
};

pub const ENV_PREFIX: &str = "RFQ_LEDGER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerSettings {
    pub write_latency_ms: u64,
    pub read_latency_ms: u64,
    pub rfq_deadline_days: u32,
    pub log_filter: String,
}

impl LedgerSettings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// `env` replaces the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: LedgerSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(env))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("write_latency_ms", DEFAULT_WRITE_LATENCY.as_millis() as i64)?
            .set_default("read_latency_ms", DEFAULT_READ_LATENCY.as_millis() as i64)?
            .set_default("rfq_deadline_days", i64::from(DEFAULT_DEADLINE_DAYS))?
            .set_default("log_filter", "info")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // a zero-day horizon would stamp deadlines that are not in the future
        if self.rfq_deadline_days == 0 {
            return Err(ConfigError::Message("rfq_deadline_days must be at least 1".into()));
        }
        Ok(())
    }

    pub fn profile(&self) -> SimulationProfile {
        SimulationProfile {
            write_latency: Duration::from_millis(self.write_latency_ms),
            read_latency: Duration::from_millis(self.read_latency_ms),
            deadline_days: self.rfq_deadline_days,
        }
    }
}
