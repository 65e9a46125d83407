//! In-memory node tree with injectable failures, for exercising the
//! migration against partial store outages.

use super::{ancestors, CoordinationStore, NodeStat, StoreError, StoreResult};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    data: Vec<u8>,
    version: i32
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RefCell<BTreeMap<String, Node>>,
    calls: Cell<usize>,
    writes: Cell<usize>,
    deletes: Cell<usize>,
    fail_writes_after: Cell<Option<usize>>,
    fail_deletes_after: Cell<Option<usize>>,
    fail_reads_of: RefCell<Option<String>>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Creates `path` (and its ancestors) holding `payload`.
    pub fn seed(&self, path: &str, payload: &str) {
        self.insert_ancestors(path);
        self.nodes.borrow_mut().insert(path.to_string(), Node {
            data: payload.as_bytes().to_vec(),
            version: 0
        });
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.nodes.borrow().get(path)
            .map(|node| String::from_utf8_lossy(&node.data).into_owned())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    /// Every node at or below `prefix`, with its payload.
    pub fn subtree(&self, prefix: &str) -> BTreeMap<String, String> {
        let below = format!("{}/", prefix);
        self.nodes.borrow().iter()
            .filter(|(path, _)| path.as_str() == prefix || path.starts_with(&below))
            .map(|(path, node)| (path.clone(), String::from_utf8_lossy(&node.data).into_owned()))
            .collect()
    }

    pub fn dump(&self) -> BTreeMap<String, String> {
        self.subtree("")
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Lets `n` more creates/writes succeed, then fails the rest.
    pub fn fail_writes_after(&self, n: usize) {
        self.fail_writes_after.set(Some(self.writes.get() + n));
    }

    /// Lets `n` more single-node deletes succeed, then fails the rest.
    pub fn fail_deletes_after(&self, n: usize) {
        self.fail_deletes_after.set(Some(self.deletes.get() + n));
    }

    pub fn fail_reads_of(&self, path: &str) {
        *self.fail_reads_of.borrow_mut() = Some(path.to_string());
    }

    pub fn heal(&self) {
        self.fail_writes_after.set(None);
        self.fail_deletes_after.set(None);
        *self.fail_reads_of.borrow_mut() = None;
    }

    fn insert_ancestors(&self, path: &str) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in ancestors(path) {
            nodes.entry(ancestor.to_string()).or_insert_with(|| Node {
                data: Vec::new(),
                version: 0
            });
        }
    }

    fn node_exists(&self, path: &str) -> bool {
        path == "/" || self.nodes.borrow().contains_key(path)
    }

    fn children_of(&self, path: &str) -> BTreeSet<String> {
        let prefix = if path == "/" { "/".to_string() } else { format!("{}/", path) };
        self.nodes.borrow().range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .map(|(p, _)| &p[prefix.len()..])
            .filter(|rest| !rest.contains('/'))
            .map(|rest| rest.to_string())
            .collect()
    }

    fn check_write(&self, op: &'static str, path: &str) -> StoreResult<()> {
        if let Some(limit) = self.fail_writes_after.get() {
            if self.writes.get() >= limit {
                return Err(StoreError::backend(op, path, "connection loss"));
            }
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn delete_node(&self, path: &str) -> StoreResult<()> {
        if let Some(limit) = self.fail_deletes_after.get() {
            if self.deletes.get() >= limit {
                return Err(StoreError::backend("delete", path, "connection loss"));
            }
        }
        self.deletes.set(self.deletes.get() + 1);
        self.nodes.borrow_mut().remove(path);
        Ok(())
    }
}

impl CoordinationStore for MemoryStore {
    fn list_children(&self, path: &str) -> StoreResult<BTreeSet<String>> {
        self.calls.set(self.calls.get() + 1);
        if !self.node_exists(path) {
            return Err(StoreError::NoNode(path.to_string()));
        }
        Ok(self.children_of(path))
    }

    fn read(&self, path: &str) -> StoreResult<(Vec<u8>, NodeStat)> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_reads_of.borrow().as_deref() == Some(path) {
            return Err(StoreError::backend("read", path, "connection loss"));
        }
        let node = self.nodes.borrow().get(path).cloned()
            .ok_or_else(|| StoreError::NoNode(path.to_string()))?;
        Ok((node.data, NodeStat { version: node.version }))
    }

    fn create(&self, path: &str, payload: &[u8], make_path: bool) -> StoreResult<()> {
        self.calls.set(self.calls.get() + 1);
        self.check_write("create", path)?;
        if self.node_exists(path) {
            return Err(StoreError::NodeExists(path.to_string()));
        }
        if make_path {
            self.insert_ancestors(path);
        } else if let Some(parent) = ancestors(path).last() {
            if !self.node_exists(parent) {
                return Err(StoreError::NoNode(parent.to_string()));
            }
        }
        self.nodes.borrow_mut().insert(path.to_string(), Node {
            data: payload.to_vec(),
            version: 0
        });
        Ok(())
    }

    fn write(&self, path: &str, payload: &[u8]) -> StoreResult<()> {
        self.calls.set(self.calls.get() + 1);
        self.check_write("write", path)?;
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes.get_mut(path)
            .ok_or_else(|| StoreError::NoNode(path.to_string()))?;
        node.data = payload.to_vec();
        node.version += 1;
        Ok(())
    }

    fn delete_recursive(&self, path: &str) -> StoreResult<()> {
        self.calls.set(self.calls.get() + 1);
        if !self.node_exists(path) {
            return Ok(());
        }
        // Deepest first, the same order a real client has to use.
        let mut doomed: Vec<String> = self.subtree(path).into_iter().map(|(p, _)| p).collect();
        doomed.sort_by_key(|p| std::cmp::Reverse(p.matches('/').count()));
        for node in doomed {
            self.delete_node(&node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_direct_children_only() {
        let store = MemoryStore::new();
        store.seed("/consumers/g1/offsets/topicA/0", "100");
        store.seed("/consumers/g1/offsets/topicB/0", "5");

        let topics = store.list_children("/consumers/g1/offsets").unwrap();
        assert_eq!(topics.into_iter().collect::<Vec<_>>(), vec!["topicA", "topicB"]);
        assert!(matches!(store.list_children("/consumers/g2"), Err(StoreError::NoNode(_))));
    }

    #[test]
    fn create_without_make_path_needs_parent() {
        let store = MemoryStore::new();
        let err = store.create("/consumers/g1/offsets", b"", false).unwrap_err();
        assert!(matches!(err, StoreError::NoNode(p) if p == "/consumers/g1"));

        store.create("/consumers/g1/offsets/t/0", b"7", true).unwrap();
        assert_eq!(store.get("/consumers/g1/offsets/t/0").as_deref(), Some("7"));
        assert!(matches!(
            store.create("/consumers/g1/offsets/t/0", b"8", true),
            Err(StoreError::NodeExists(_))
        ));
    }

    #[test]
    fn partial_delete_can_be_repeated() {
        let store = MemoryStore::new();
        store.seed("/consumers/g1/offsets/t/0", "1");
        store.seed("/consumers/g1/offsets/t/1", "2");

        store.fail_deletes_after(1);
        assert!(store.delete_recursive("/consumers/g1").is_err());
        assert!(store.exists("/consumers/g1"));

        store.heal();
        store.delete_recursive("/consumers/g1").unwrap();
        assert!(store.subtree("/consumers/g1").is_empty());
        store.delete_recursive("/consumers/g1").unwrap();
        assert!(store.exists("/consumers"));
    }
}
