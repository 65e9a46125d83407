use crate::error::{RenameError, Result};
use crate::store::{child_path, CoordinationStore};
use serde::Deserialize;
use tracing::{debug, warn};

const BROKER_IDS: &str = "/brokers/ids";

/// A broker's registration under `/brokers/ids/<id>`. Newer brokers leave
/// `host` null and advertise listeners in `endpoints` instead.
#[derive(Debug, Deserialize)]
struct BrokerInfo {
    host: Option<String>,
    #[serde(default)]
    port: i32,
    #[serde(default)]
    endpoints: Vec<String>
}

impl BrokerInfo {
    fn address(&self) -> Option<String> {
        match &self.host {
            Some(host) if self.port > 0 => Some(format!("{}:{}", host, self.port)),
            _ => self.endpoints.iter()
                .filter_map(|endpoint| endpoint.splitn(2, "://").nth(1))
                .next()
                .map(String::from)
        }
    }
}

/// Bootstrap addresses of every broker registered in ZooKeeper.
pub fn discover_brokers<S>(store: &S) -> Result<Vec<String>>
    where S: CoordinationStore + ?Sized
{
    let ids = store.list_children(BROKER_IDS)
        .map_err(|e| RenameError::bootstrap("list registered brokers", e))?;

    let mut servers = Vec::new();
    for id in ids {
        let path = child_path(BROKER_IDS, &id);
        let (data, _) = match store.read(&path) {
            Ok(node) => node,
            Err(e) => {
                warn!(path = %path, error = %e, "skipping broker registration");
                continue;
            }
        };
        match serde_json::from_slice::<BrokerInfo>(&data).ok().and_then(|info| info.address()) {
            Some(address) => {
                debug!(broker = %id, address = %address, "discovered broker");
                servers.push(address);
            },
            None => warn!(path = %path, "unusable broker registration")
        }
    }

    if servers.is_empty() {
        return Err(RenameError::bootstrap("discover brokers", "no brokers are registered in ZooKeeper"));
    }
    Ok(servers)
}
