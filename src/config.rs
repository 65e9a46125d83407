use crate::error::{RenameError, Result};
use crate::group::paths::OffsetPaths;
use clap::ArgMatches;
use std::time::Duration;

/// Where the cluster lives, resolved from flags and their environment
/// fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Kafka bootstrap servers; when absent they are discovered from
    /// ZooKeeper's broker registrations.
    pub servers: Option<Vec<String>>,
    pub zookeeper: String,
    pub offsets: OffsetPaths,
    pub zk_timeout: Duration,
    pub metadata_timeout: Duration
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let servers = matches.values_of("server")
            .map(|values| values.map(String::from).collect::<Vec<_>>())
            .filter(|servers| !servers.is_empty());

        Ok(Config {
            servers,
            zookeeper: matches.value_of("zookeeper").unwrap_or(DEFAULT_ZOOKEEPER).to_string(),
            offsets: OffsetPaths::new(matches.value_of("zk-root").unwrap_or(crate::group::paths::DEFAULT_ROOT)),
            zk_timeout: seconds(matches, "zk-timeout")?,
            metadata_timeout: seconds(matches, "metadata-timeout")?
        })
    }
}

pub const DEFAULT_ZOOKEEPER: &str = "localhost:2181";

fn seconds(matches: &ArgMatches, name: &str) -> Result<Duration> {
    let value = matches.value_of(name).unwrap_or("0");
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(RenameError::Usage(format!("--{} must be a positive number of seconds, got {:?}", name, value)))
    }
}
