use super::topology::{DestinationGroup, GroupTopology};

/// Topics both groups claim, sorted. A shared topic that is nothing but a
/// copy of the source's offsets is left to the confirmation step.
pub fn conflicting_topics(source: &GroupTopology, destination: &DestinationGroup) -> Vec<String> {
    destination.own_topics().into_iter()
        .filter(|topic| source.contains_topic(topic))
        .collect()
}
