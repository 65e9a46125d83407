use super::paths::{OffsetPaths, RENAME_MARKER};
use super::topology::GroupTopology;
use crate::error::{RenameError, Result};
use crate::store::{child_path, CoordinationStore, StoreError, StoreResult};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// How far a rename has got. Anything short of `OffsetsWritten` has not
/// written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationState {
    Start,
    TopologyResolved,
    ConflictsChecked,
    Confirmed,
    SkippedConfirmation,
    OffsetsRead,
    OffsetsWritten,
    SourceRetired
}

impl MigrationState {
    pub fn can_advance_to(self, next: MigrationState) -> bool {
        use MigrationState::*;

        match (self, next) {
            (Start, TopologyResolved) => true,
            (TopologyResolved, ConflictsChecked) => true,
            (ConflictsChecked, Confirmed) | (ConflictsChecked, SkippedConfirmation) => true,
            (Confirmed, OffsetsRead) | (SkippedConfirmation, OffsetsRead) => true,
            (OffsetsRead, OffsetsWritten) => true,
            (OffsetsWritten, SourceRetired) => true,
            _ => false
        }
    }

    pub fn is_terminal(self) -> bool {
        self == MigrationState::SourceRetired
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MigrationState::Start => "START",
            MigrationState::TopologyResolved => "TOPOLOGY_RESOLVED",
            MigrationState::ConflictsChecked => "CONFLICTS_CHECKED",
            MigrationState::Confirmed => "CONFIRMED",
            MigrationState::SkippedConfirmation => "SKIPPED_CONFIRMATION",
            MigrationState::OffsetsRead => "OFFSETS_READ",
            MigrationState::OffsetsWritten => "OFFSETS_WRITTEN",
            MigrationState::SourceRetired => "SOURCE_RETIRED"
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionOffset {
    pub topic: String,
    pub partition: i32,
    pub offset: u64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub created: usize,
    pub overwritten: usize
}

pub fn parse_offset(payload: &[u8]) -> Option<u64> {
    std::str::from_utf8(payload).ok()?.trim().parse().ok()
}

/// Moves committed offsets from one group's subtree to another's.
pub struct OffsetMigrator<'a, S: CoordinationStore + ?Sized> {
    store: &'a S,
    paths: &'a OffsetPaths,
    old_group: &'a str,
    new_group: &'a str
}

impl <'a, S: CoordinationStore + ?Sized> OffsetMigrator<'a, S> {
    pub fn new(store: &'a S, paths: &'a OffsetPaths, old_group: &'a str, new_group: &'a str) -> Self {
        OffsetMigrator {
            store,
            paths,
            old_group,
            new_group
        }
    }

    /// Reads every offset of `topology` before anything is written, so a
    /// vanished or garbled node stops the run with the store untouched.
    pub fn read_offsets(&self, topology: &GroupTopology) -> Result<Vec<PartitionOffset>> {
        topology.iter()
            .map(|(topic, partition)| -> Result<PartitionOffset> {
                let path = self.paths.partition(self.old_group, topic, partition);
                let (payload, stat) = self.store.read(&path)
                    .map_err(|source| RenameError::StoreRead {
                        group: self.old_group.to_string(),
                        source
                    })?;
                let offset = parse_offset(&payload)
                    .ok_or_else(|| RenameError::BadOffset {
                        path: path.clone(),
                        payload: String::from_utf8_lossy(&payload).into_owned()
                    })?;
                debug!(path = %path, offset, version = stat.version, "read offset");
                Ok(PartitionOffset {
                    topic: topic.to_string(),
                    partition,
                    offset
                })
            })
            .collect()
    }

    /// Creates each offset under the new group. A node that is already there
    /// is overwritten only when its topic is in `resumed`.
    pub fn write_offsets(&self, offsets: &[PartitionOffset], resumed: &BTreeSet<String>) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        for entry in offsets {
            let path = self.paths.partition(self.new_group, &entry.topic, entry.partition);
            let payload = entry.offset.to_string();

            match self.store.create(&path, payload.as_bytes(), true) {
                Ok(()) => summary.created += 1,
                Err(StoreError::NodeExists(_)) if resumed.contains(&entry.topic) => {
                    self.store.write(&path, payload.as_bytes())
                        .map_err(|source| self.write_failed(source))?;
                    summary.overwritten += 1;
                },
                Err(source) => return Err(self.write_failed(source))
            }
            debug!(path = %path, offset = entry.offset, "wrote offset");
        }

        info!(group = self.new_group, created = summary.created, overwritten = summary.overwritten, "offsets written");
        Ok(summary)
    }

    /// Whether an earlier run of this rename copied everything and then
    /// failed while removing the old group. An unfinished rename of the old
    /// group to some other group is an error.
    pub fn pending_retire(&self) -> Result<bool> {
        let marker = self.paths.rename_marker(self.old_group);
        let renamed_to = match self.store.read(&marker) {
            Ok((payload, _)) => String::from_utf8_lossy(&payload).trim().to_string(),
            Err(StoreError::NoNode(_)) => return Ok(false),
            Err(source) => return Err(RenameError::StoreRead {
                group: self.old_group.to_string(),
                source
            })
        };

        if renamed_to == self.new_group {
            Ok(true)
        } else {
            Err(RenameError::AlreadyRenamed {
                old_group: self.old_group.to_string(),
                renamed_to
            })
        }
    }

    /// Deletes the whole old group. Only call once every write has landed.
    ///
    /// The rename marker goes in first and comes out last, so a re-run can
    /// tell a half-removed group from one that was never copied.
    pub fn retire_source(&self) -> Result<()> {
        let group = self.paths.group(self.old_group);
        let marker = self.paths.rename_marker(self.old_group);

        self.mark_renamed(&marker).map_err(|source| self.retire_failed(source))?;

        let children = match self.store.list_children(&group) {
            Ok(children) => children,
            Err(StoreError::NoNode(_)) => BTreeSet::new(),
            Err(source) => return Err(self.retire_failed(source))
        };
        for child in children.iter().filter(|c| c.as_str() != RENAME_MARKER) {
            self.store.delete_recursive(&child_path(&group, child))
                .map_err(|source| self.retire_failed(source))?;
        }
        self.store.delete_recursive(&group)
            .map_err(|source| self.retire_failed(source))?;

        info!(group = self.old_group, path = %group, "removed old group");
        Ok(())
    }

    fn mark_renamed(&self, marker: &str) -> StoreResult<()> {
        let payload = self.new_group.as_bytes();
        match self.store.create(marker, payload, false) {
            Err(StoreError::NodeExists(_)) => self.store.write(marker, payload),
            other => other
        }
    }

    fn retire_failed(&self, source: StoreError) -> RenameError {
        RenameError::StoreRetire {
            old_group: self.old_group.to_string(),
            new_group: self.new_group.to_string(),
            source
        }
    }

    fn write_failed(&self, source: StoreError) -> RenameError {
        RenameError::StoreWrite {
            new_group: self.new_group.to_string(),
            source
        }
    }
}
