//! Configuration.

pub mod error;
pub mod rules;

pub use error::Error;
pub use rules::{DataSourceRule, LoadBalancer, ReplicaQueryConfig};

use std::fs::{read_to_string, write};
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::balancer::RoundRobin;

/// Load the configuration file on startup.
///
/// A missing file isn't an error: defaults are used instead,
/// which means no rules are configured. Any other I/O error is.
pub fn load(path: &Path) -> Result<Config, Error> {
    match read(path) {
        Err(Error::Io(err)) if err.kind() == ErrorKind::NotFound => {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                path.display()
            );
            Ok(Config::default())
        }
        result => result,
    }
}

/// Read the configuration file. The file must exist.
pub fn read(path: &Path) -> Result<Config, Error> {
    let source = read_to_string(path)?;
    let config = Config::from_toml(&source)?;
    info!("loaded \"{}\"", path.display());
    Ok(config)
}

/// Write the configuration file to disk.
pub fn save(path: &Path, config: &Config) -> Result<(), Error> {
    write(path, config.to_toml()?)?;
    info!("saved \"{}\"", path.display());
    Ok(())
}

/// replica_query.toml
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: General,
    /// Replica query rules.
    #[serde(flatten)]
    pub rules: ReplicaQueryConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(|err| Error::config(source, err))
    }

    /// Serialize configuration into TOML text.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct General {
    /// Balancer type used by rules that don't name one.
    #[serde(default = "General::default_load_balancer")]
    pub default_load_balancer: String,
    /// Spawn this many Tokio threads. 0 runs everything on the main thread.
    #[serde(default = "General::workers")]
    pub workers: usize,
}

impl Default for General {
    fn default() -> Self {
        Self {
            default_load_balancer: Self::default_load_balancer(),
            workers: Self::workers(),
        }
    }
}

impl General {
    fn default_load_balancer() -> String {
        RoundRobin::TYPE.into()
    }

    fn workers() -> usize {
        0
    }
}
