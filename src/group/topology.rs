use super::migrate::parse_offset;
use super::paths::OffsetPaths;
use crate::catalog::TopicCatalog;
use crate::error::{RenameError, Result};
use crate::store::{CoordinationStore, StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Topics a group has committed offsets for, and under each the partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTopology {
    topics: BTreeMap<String, BTreeSet<i32>>
}

impl GroupTopology {
    pub fn new() -> GroupTopology {
        GroupTopology::default()
    }

    pub fn insert(&mut self, topic: &str, partition: i32) {
        self.topics.entry(topic.to_string()).or_default().insert(partition);
    }

    pub fn topics(&self) -> impl Iterator<Item=&str> {
        self.topics.keys().map(|t| t.as_str())
    }

    pub fn topic_set(&self) -> BTreeSet<String> {
        self.topics.keys().cloned().collect()
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn partitions(&self, topic: &str) -> Option<&BTreeSet<i32>> {
        self.topics.get(topic)
    }

    /// Every (topic, partition) pair, topic-major.
    pub fn iter(&self) -> impl Iterator<Item=(&str, i32)> {
        self.topics.iter()
            .flat_map(|(topic, partitions)| partitions.iter().map(move |p| (topic.as_str(), *p)))
    }

    pub fn partition_count(&self) -> usize {
        self.topics.values().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Topics under `<root>/<group>/offsets`; a group that was never committed
/// to has none.
pub fn list_group_topics<S>(store: &S, paths: &OffsetPaths, group: &str) -> StoreResult<BTreeSet<String>>
    where S: CoordinationStore + ?Sized
{
    match store.list_children(&paths.offsets(group)) {
        Ok(topics) => Ok(topics),
        Err(StoreError::NoNode(_)) => Ok(BTreeSet::new()),
        Err(e) => Err(e)
    }
}

/// Resolves what `group` is consuming, keeping only partitions the brokers
/// still know about.
pub fn read_group_topology<S>(
    store: &S,
    paths: &OffsetPaths,
    catalog: &TopicCatalog,
    group: &str
) -> Result<GroupTopology>
    where S: CoordinationStore + ?Sized
{
    let store_err = |source| RenameError::StoreRead { group: group.to_string(), source };
    let mut topology = GroupTopology::new();

    for topic in list_group_topics(store, paths, group).map_err(store_err)? {
        if catalog.partitions(&topic).is_none() {
            warn!(group, topic = %topic, "topic does not exist in the cluster; its offsets will not be migrated");
            continue;
        }

        let children = match store.list_children(&paths.topic(group, &topic)) {
            Ok(children) => children,
            Err(StoreError::NoNode(_)) => continue,
            Err(e) => return Err(store_err(e))
        };

        for child in children {
            match child.parse::<i32>() {
                Ok(partition) if catalog.has_partition(&topic, partition) => topology.insert(&topic, partition),
                Ok(partition) => warn!(group, topic = %topic, partition,
                    "partition does not exist in the cluster; its offset will not be migrated"),
                Err(_) => warn!(group, topic = %topic, node = %child, "ignoring non-partition node")
            }
        }
    }

    if topology.is_empty() {
        return Err(RenameError::GroupNotFound(group.to_string()));
    }

    debug!(group, root = paths.root(), topics = topology.topics.len(), partitions = topology.partition_count(), "resolved group topology");
    Ok(topology)
}

/// What already lives under the new group id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationGroup {
    /// Topics holding at least one partition node.
    pub topics: BTreeSet<String>,
    /// Shared topics whose every partition also exists in the source with
    /// the same offset: what an interrupted write phase of this rename leaves.
    pub resumed: BTreeSet<String>
}

impl DestinationGroup {
    pub fn inspect<S>(
        store: &S,
        paths: &OffsetPaths,
        old_group: &str,
        new_group: &str,
        source: &GroupTopology
    ) -> Result<DestinationGroup>
        where S: CoordinationStore + ?Sized
    {
        let store_err = |source| RenameError::StoreRead { group: new_group.to_string(), source };
        let mut destination = DestinationGroup::default();

        for topic in list_group_topics(store, paths, new_group).map_err(store_err)? {
            let partitions = match store.list_children(&paths.topic(new_group, &topic)) {
                Ok(partitions) => partitions,
                Err(StoreError::NoNode(_)) => continue,
                Err(e) => return Err(store_err(e))
            };
            if partitions.is_empty() {
                debug!(group = new_group, topic = %topic, "ignoring topic without partitions");
                continue;
            }

            if is_leftover(store, paths, old_group, new_group, &topic, &partitions, source).map_err(store_err)? {
                debug!(group = new_group, topic = %topic, "topic looks partially migrated by an earlier run");
                destination.resumed.insert(topic.clone());
            }
            destination.topics.insert(topic);
        }

        Ok(destination)
    }

    pub fn exists(&self) -> bool {
        !self.topics.is_empty()
    }

    /// Topics the destination owns in its own right.
    pub fn own_topics(&self) -> BTreeSet<String> {
        self.topics.difference(&self.resumed).cloned().collect()
    }
}

fn is_leftover<S>(
    store: &S,
    paths: &OffsetPaths,
    old_group: &str,
    new_group: &str,
    topic: &str,
    partitions: &BTreeSet<String>,
    source: &GroupTopology
) -> StoreResult<bool>
    where S: CoordinationStore + ?Sized
{
    let source_partitions = match source.partitions(topic) {
        Some(partitions) => partitions,
        None => return Ok(false)
    };

    for child in partitions {
        let partition = match child.parse::<i32>() {
            Ok(p) if source_partitions.contains(&p) => p,
            _ => return Ok(false)
        };
        let copied = read_offset(store, &paths.partition(new_group, topic, partition))?;
        let original = read_offset(store, &paths.partition(old_group, topic, partition))?;
        if copied.is_none() || copied != original {
            return Ok(false);
        }
    }
    Ok(true)
}

fn read_offset<S>(store: &S, path: &str) -> StoreResult<Option<u64>>
    where S: CoordinationStore + ?Sized
{
    let (payload, _) = store.read(path)?;
    Ok(parse_offset(&payload))
}
