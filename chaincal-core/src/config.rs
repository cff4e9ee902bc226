//! chaincal configuration.
//!
//! Layered as: built-in defaults, then `~/.config/chaincal/config.toml`, then
//! `CHAINCAL_*` environment variables. The result is an explicit
//! [`ChainCalConfig`] handed to constructors; nothing reads the environment
//! after startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::ObjectId;

const ENV_PREFIX: &str = "CHAINCAL";
const DEFAULT_SIGNER: &str = "chaincal-signer";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Which ledger deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Local,
    Production,
}

impl Network {
    fn parse(s: &str) -> ChainCalResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "localnet" | "dev" => Ok(Network::Local),
            "production" | "prod" | "mainnet" => Ok(Network::Production),
            other => Err(ChainCalError::Config(format!(
                "Unknown network '{other}'. Expected 'local' or 'production'"
            ))),
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Local => "http://127.0.0.1:9000",
            Network::Production => "https://fullnode.mainnet.sui.io:443",
        }
    }

    /// Blind wait after a write before reads are trusted again.
    pub fn default_settle_delay(&self) -> Duration {
        match self {
            Network::Local => Duration::from_millis(1000),
            Network::Production => Duration::from_millis(5000),
        }
    }
}

/// How a write waits for the ledger before the view is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Sleep a constant duration after every settling write.
    Fixed(Duration),
    /// Skip the sleep; the reconciler re-reads every `interval` until the
    /// expected state shows up or `timeout` elapses.
    Poll { interval: Duration, timeout: Duration },
}

impl SettlePolicy {
    pub fn fixed_for(network: Network) -> Self {
        SettlePolicy::Fixed(network.default_settle_delay())
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    package_id: Option<String>,
    statistics_object_id: Option<String>,
    network: Option<String>,
    rpc_url: Option<String>,
    settle: Option<String>,
    settle_delay: Option<String>,
    poll_interval: Option<String>,
    poll_timeout: Option<String>,
    signer: Option<String>,
    timezone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChainCalConfig {
    /// Address of the deployed calendar package.
    pub package_id: ObjectId,
    /// The shared statistics singleton passed to most entry points.
    pub statistics_object_id: ObjectId,
    pub network: Network,
    pub rpc_url: String,
    pub settle: SettlePolicy,
    /// Name or path of the external signer executable.
    pub signer: String,
    /// Timezone used for day-based comparisons and naive date input.
    pub timezone: Tz,
}

impl ChainCalConfig {
    /// Config with network defaults for everything but the two required ids.
    pub fn new(package_id: ObjectId, statistics_object_id: ObjectId, network: Network) -> Self {
        ChainCalConfig {
            package_id,
            statistics_object_id,
            network,
            rpc_url: network.default_rpc_url().to_string(),
            settle: SettlePolicy::fixed_for(network),
            signer: DEFAULT_SIGNER.to_string(),
            timezone: chrono_tz::UTC,
        }
    }

    pub fn config_path() -> ChainCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChainCalError::Config("Could not determine config directory".into()))?
            .join("chaincal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config file and the process environment.
    pub fn load() -> ChainCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_with(Some(&config_path), None)
    }

    /// Load from an optional config file and an environment map.
    /// `env: None` reads the process environment.
    pub fn load_with(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> ChainCalResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let raw: RawConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()
            .map_err(|e| ChainCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ChainCalError::Config(e.to_string()))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> ChainCalResult<Self> {
        let package_id = required(raw.package_id, "package_id")?;
        let statistics_object_id = required(raw.statistics_object_id, "statistics_object_id")?;

        let network = match raw.network.as_deref() {
            Some(s) => Network::parse(s)?,
            None => Network::default(),
        };

        let mut config = ChainCalConfig::new(
            ObjectId::new(package_id),
            ObjectId::new(statistics_object_id),
            network,
        );

        if let Some(url) = raw.rpc_url {
            config.rpc_url = url;
        }
        if let Some(signer) = raw.signer {
            config.signer = signer;
        }
        if let Some(tz) = raw.timezone {
            config.timezone = tz
                .parse::<Tz>()
                .map_err(|e| ChainCalError::Config(format!("Invalid timezone '{tz}': {e}")))?;
        }

        let settle_delay = match raw.settle_delay.as_deref() {
            Some(s) => parse_duration("settle_delay", s)?,
            None => network.default_settle_delay(),
        };

        config.settle = match raw.settle.as_deref().unwrap_or("fixed") {
            "fixed" => SettlePolicy::Fixed(settle_delay),
            "poll" => SettlePolicy::Poll {
                interval: match raw.poll_interval.as_deref() {
                    Some(s) => parse_duration("poll_interval", s)?,
                    None => DEFAULT_POLL_INTERVAL,
                },
                timeout: match raw.poll_timeout.as_deref() {
                    Some(s) => parse_duration("poll_timeout", s)?,
                    None => settle_delay * 6,
                },
            },
            other => {
                return Err(ChainCalError::Config(format!(
                    "Unknown settle mode '{other}'. Expected 'fixed' or 'poll'"
                )));
            }
        };

        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ChainCalResult<()> {
        let contents = format!(
            "\
# chaincal configuration
# Every key can also be set as an environment variable, e.g. CHAINCAL_PACKAGE_ID.

# Deployed calendar package and statistics object (required):
# package_id = \"0x...\"
# statistics_object_id = \"0x...\"

# \"local\" or \"production\":
# network = \"local\"
# rpc_url = \"{}\"

# \"fixed\" waits settle_delay after each write, \"poll\" re-reads until the write shows up:
# settle = \"fixed\"
# settle_delay = \"1s\"
# poll_interval = \"500ms\"
# poll_timeout = \"6s\"

# signer = \"{}\"
# timezone = \"UTC\"
",
            Network::Local.default_rpc_url(),
            DEFAULT_SIGNER
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChainCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ChainCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn required(value: Option<String>, key: &str) -> ChainCalResult<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        ChainCalError::Config(format!(
            "Missing '{key}'. Set it in the config file or as {ENV_PREFIX}_{}",
            key.to_ascii_uppercase()
        ))
    })
}

fn parse_duration(key: &str, value: &str) -> ChainCalResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| ChainCalError::Config(format!("Invalid {key} '{value}': {e}")))
}
