use crate::protocol::messages::metadata;
use std::collections::{BTreeMap, BTreeSet};

/// Topics and partition ids the brokers currently know about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: BTreeMap<String, BTreeSet<i32>>
}

impl TopicCatalog {
    pub fn partitions(&self, topic: &str) -> Option<&BTreeSet<i32>> {
        self.topics.get(topic)
    }

    pub fn has_partition(&self, topic: &str, partition: i32) -> bool {
        self.partitions(topic).map_or(false, |p| p.contains(&partition))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }
}

#[cfg(test)]
impl TopicCatalog {
    pub fn new() -> TopicCatalog {
        TopicCatalog::default()
    }

    pub fn with_topic<I: IntoIterator<Item=i32>>(mut self, topic: &str, partitions: I) -> TopicCatalog {
        self.topics.insert(topic.to_string(), partitions.into_iter().collect());
        self
    }
}

impl From<&metadata::Response> for TopicCatalog {
    fn from(response: &metadata::Response) -> TopicCatalog {
        // A topic with an error but a partition list (e.g. leader not
        // available) still exists; unknown topics come back with none.
        let topics = response.topic_metadata.iter()
            .filter(|topic| !topic.partition_metadata.is_empty())
            .map(|topic| (topic.topic.clone(), topic.partition_ids().collect()))
            .collect();
        TopicCatalog { topics }
    }
}
