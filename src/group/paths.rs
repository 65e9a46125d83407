use crate::store::child_path;

pub const DEFAULT_ROOT: &str = "/consumers";

/// Child of an old group naming the group its offsets were copied to. It
/// exists only while the old group is being removed.
pub const RENAME_MARKER: &str = "renamed-to";

/// Lays out `<root>/<group>/offsets/<topic>/<partition>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPaths {
    root: String
}

impl OffsetPaths {
    pub fn new(root: &str) -> OffsetPaths {
        let trimmed = root.trim_end_matches('/');
        let root = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        OffsetPaths { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn group(&self, group: &str) -> String {
        child_path(&self.root, group)
    }

    pub fn rename_marker(&self, group: &str) -> String {
        child_path(&self.group(group), RENAME_MARKER)
    }

    pub fn offsets(&self, group: &str) -> String {
        format!("{}/offsets", self.group(group))
    }

    pub fn topic(&self, group: &str, topic: &str) -> String {
        format!("{}/{}", self.offsets(group), topic)
    }

    pub fn partition(&self, group: &str, topic: &str, partition: i32) -> String {
        format!("{}/{}", self.topic(group, topic), partition)
    }
}

impl Default for OffsetPaths {
    fn default() -> OffsetPaths {
        OffsetPaths::new(DEFAULT_ROOT)
    }
}

/// A group id has to be usable as a single path segment.
pub fn validate_group_id(group: &str) -> Result<(), String> {
    if group.is_empty() {
        Err("Consumer group ID must not be empty.".to_string())
    } else if group.contains('/') {
        Err(format!("Consumer group ID {} must not contain '/'.", group))
    } else if group == "." || group == ".." {
        Err(format!("Consumer group ID {} is not a valid path segment.", group))
    } else {
        Ok(())
    }
}
