//! Path-addressed node tree the consumer offsets live in.
//!
//! Every operation touches a single node except `delete_recursive`, and
//! nothing spans more than one call atomically. Callers that need multi-node
//! changes have to order their calls so a partial failure is recoverable.

#[cfg(test)]
pub mod memory;
pub mod zk;

use std::collections::BTreeSet;
use std::error::Error as StdError;
use thiserror::Error;

pub use zk::ZkStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node {0} does not exist")]
    NoNode(String),

    #[error("node {0} already exists")]
    NodeExists(String),

    #[error("{op} {path} failed: {source}")]
    Backend {
        op: &'static str,
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>
    }
}

impl StoreError {
    pub fn backend<E>(op: &'static str, path: &str, source: E) -> StoreError
        where E: Into<Box<dyn StdError + Send + Sync>>
    {
        StoreError::Backend {
            op,
            path: path.to_string(),
            source: source.into()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStat {
    pub version: i32
}

pub trait CoordinationStore {
    /// Fails with `NoNode` when `path` is absent.
    fn list_children(&self, path: &str) -> StoreResult<BTreeSet<String>>;

    fn read(&self, path: &str) -> StoreResult<(Vec<u8>, NodeStat)>;

    /// Fails with `NodeExists` if the node is already there. With `make_path`,
    /// missing ancestors are created empty first.
    fn create(&self, path: &str, payload: &[u8], make_path: bool) -> StoreResult<()>;

    /// Replaces the payload of an existing node.
    fn write(&self, path: &str, payload: &[u8]) -> StoreResult<()>;

    /// Deletes `path` and everything below it. An absent node counts as
    /// deleted, so a half-finished delete can simply be repeated.
    fn delete_recursive(&self, path: &str) -> StoreResult<()>;
}

pub fn child_path(parent: &str, child: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Every proper ancestor of `path`, shallowest first, excluding the root.
pub fn ancestors(path: &str) -> Vec<&str> {
    path.match_indices('/')
        .map(|(i, _)| &path[..i])
        .filter(|p| !p.is_empty())
        .collect()
}
