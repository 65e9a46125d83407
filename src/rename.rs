use crate::brokers::discover_brokers;
use crate::catalog::TopicCatalog;
use crate::config::Config;
use crate::error::{RenameError, Result};
use crate::group::confirm::TerminalConfirm;
use crate::group::{self, check_group_ids, MigrationReport};
use crate::protocol;
use crate::store::ZkStore;
use clap::ArgMatches;
use itertools::join;
use std::time::Duration;
use tracing::debug;

pub fn run(config: &Config, matches: &ArgMatches) -> i32 {
    let old_group = matches.value_of("old_groupid").unwrap_or_default();
    let new_group = matches.value_of("new_groupid").unwrap_or_default();

    match rename_group(config, old_group, new_group) {
        Ok(report) => {
            debug_assert!(report.state.is_terminal());
            if report.cleanup_only {
                println!("Removed consumer group {}, whose offsets were already copied to {}", report.old_group, report.new_group);
                return 0;
            }
            println!("Renamed consumer group {} to {}", report.old_group, report.new_group);
            println!("  {} partition offset(s) across topic(s): {}", report.partitions, join(&report.topics, ", "));
            if report.merged {
                println!("  merged into the existing group");
            }
            if !report.resumed.is_empty() {
                println!("  resumed an earlier rename of: {}", join(&report.resumed, ", "));
            }
            0
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", e.recovery_hint());
            e.exit_code()
        }
    }
}

/// Connects, resolves the cluster's topics and runs the rename. The
/// ZooKeeper session is closed before this returns, whatever the outcome.
pub fn rename_group(config: &Config, old_group: &str, new_group: &str) -> Result<MigrationReport> {
    check_group_ids(old_group, new_group)?;

    let store = ZkStore::connect(&config.zookeeper, config.zk_timeout)
        .map_err(|e| RenameError::bootstrap("connect to ZooKeeper", e))?;

    let servers = match &config.servers {
        Some(servers) => servers.clone(),
        None => discover_brokers(&store)?
    };
    let catalog = load_catalog(&servers, config.metadata_timeout)?;

    let mut confirm = TerminalConfirm::stdio();
    group::rename_group(&store, &config.offsets, &catalog, &mut confirm, old_group, new_group)
}

fn load_catalog(servers: &[String], timeout: Duration) -> Result<TopicCatalog> {
    let mut runtime = tokio::runtime::Builder::new()
        .basic_scheduler()
        .enable_all()
        .build()
        .map_err(|e| RenameError::bootstrap("start the metadata client", e))?;

    let metadata = runtime.block_on(protocol::load_metadata(servers, timeout))
        .map_err(|e| RenameError::bootstrap("load cluster metadata", e))?;
    let catalog = TopicCatalog::from(&metadata);
    debug!(servers = %join(servers, ","), topics = catalog.len(), "loaded topic catalog");
    Ok(catalog)
}
