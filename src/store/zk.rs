use super::{ancestors, child_path, CoordinationStore, NodeStat, StoreError, StoreResult};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, trace, warn};
use zookeeper::{Acl, CreateMode, WatchedEvent, ZkError, ZooKeeper};

/// A ZooKeeper session. The session is closed when this is dropped.
pub struct ZkStore {
    zk: ZooKeeper,
    connect: String
}

impl ZkStore {
    pub fn connect(connect: &str, timeout: Duration) -> StoreResult<ZkStore> {
        let zk = ZooKeeper::connect(connect, timeout, Watcher)
            .map_err(|e| StoreError::backend("connect", connect, e))?;
        debug!(zookeeper = connect, "connected");
        Ok(ZkStore {
            zk,
            connect: connect.to_string()
        })
    }
}

impl Drop for ZkStore {
    fn drop(&mut self) {
        match self.zk.close() {
            Ok(()) => debug!(zookeeper = %self.connect, "session closed"),
            Err(e) => warn!(zookeeper = %self.connect, error = %e, "failed to close session")
        }
    }
}

fn translate(op: &'static str, path: &str, e: ZkError) -> StoreError {
    match e {
        ZkError::NoNode => StoreError::NoNode(path.to_string()),
        ZkError::NodeExists => StoreError::NodeExists(path.to_string()),
        e => StoreError::backend(op, path, e)
    }
}

impl CoordinationStore for ZkStore {
    fn list_children(&self, path: &str) -> StoreResult<BTreeSet<String>> {
        self.zk.get_children(path, false)
            .map(|children| children.into_iter().collect())
            .map_err(|e| translate("list", path, e))
    }

    fn read(&self, path: &str) -> StoreResult<(Vec<u8>, NodeStat)> {
        let (data, stat) = self.zk.get_data(path, false)
            .map_err(|e| translate("read", path, e))?;
        Ok((data, NodeStat { version: stat.version }))
    }

    fn create(&self, path: &str, payload: &[u8], make_path: bool) -> StoreResult<()> {
        if make_path {
            for ancestor in ancestors(path) {
                match self.zk.create(ancestor, Vec::new(), Acl::open_unsafe().clone(), CreateMode::Persistent) {
                    Ok(_) | Err(ZkError::NodeExists) => {},
                    Err(e) => return Err(translate("create", ancestor, e))
                }
            }
        }

        self.zk.create(path, payload.to_vec(), Acl::open_unsafe().clone(), CreateMode::Persistent)
            .map(|_| ())
            .map_err(|e| translate("create", path, e))
    }

    fn write(&self, path: &str, payload: &[u8]) -> StoreResult<()> {
        self.zk.set_data(path, payload.to_vec(), None)
            .map(|_| ())
            .map_err(|e| translate("write", path, e))
    }

    fn delete_recursive(&self, path: &str) -> StoreResult<()> {
        let children = match self.zk.get_children(path, false) {
            Ok(children) => children,
            Err(ZkError::NoNode) => return Ok(()),
            Err(e) => return Err(translate("list", path, e))
        };

        for child in children {
            self.delete_recursive(&child_path(path, &child))?;
        }

        match self.zk.delete(path, None) {
            Ok(()) | Err(ZkError::NoNode) => Ok(()),
            Err(e) => Err(translate("delete", path, e))
        }
    }
}

struct Watcher;

impl zookeeper::Watcher for Watcher {
    fn handle(&self, event: WatchedEvent) {
        trace!(?event, "zookeeper event");
    }
}
