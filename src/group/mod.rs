//! Renaming a consumer group whose offsets live in ZooKeeper.
//!
//! ZooKeeper has no multi-node rename, so a rename is a copy followed by a
//! delete:
//!
//! 1. resolve the old group's topics and partitions,
//! 2. refuse if the new group already claims any of those topics,
//! 3. ask before merging into a new group that already has other topics,
//! 4. read every old offset, then write them all under the new group,
//! 5. delete the old group.
//!
//! Nothing is written before step 4. A failure in step 4 leaves the old
//! group intact and the new one partially filled; a failure in step 5 leaves
//! the new group complete. Either way, re-running the same rename picks up
//! where the last one stopped. Topics a previous run already copied are
//! offered for overwriting at the confirmation step. An old group carrying
//! a rename marker for the same new group is simply removed.

pub mod confirm;
pub mod conflict;
pub mod migrate;
pub mod paths;
pub mod topology;

use crate::catalog::TopicCatalog;
use crate::error::{RenameError, Result};
use crate::store::CoordinationStore;
use confirm::{gate_question, Confirm};
use conflict::conflicting_topics;
use migrate::{MigrationState, OffsetMigrator};
use paths::{validate_group_id, OffsetPaths};
use topology::{read_group_topology, DestinationGroup, GroupTopology};
use tracing::{debug, info, warn};

/// Outcome of a completed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub old_group: String,
    pub new_group: String,
    pub topics: Vec<String>,
    pub partitions: usize,
    pub resumed: Vec<String>,
    pub merged: bool,
    /// Only the removal of the old group was left to do.
    pub cleanup_only: bool,
    pub state: MigrationState
}

/// Rejects a rename that could never be valid, without touching the store.
pub fn check_group_ids(old_group: &str, new_group: &str) -> Result<()> {
    if old_group == new_group {
        return Err(RenameError::Usage("Old group ID and new group ID are the same.".to_string()));
    }
    validate_group_id(old_group).map_err(RenameError::Usage)?;
    validate_group_id(new_group).map_err(RenameError::Usage)
}

struct Progress<'a> {
    state: MigrationState,
    old_group: &'a str,
    new_group: &'a str
}

impl <'a> Progress<'a> {
    fn advance(&mut self, next: MigrationState) {
        debug_assert!(self.state.can_advance_to(next), "illegal transition {} -> {}", self.state, next);
        debug!(old_group = self.old_group, new_group = self.new_group, from = %self.state, to = %next, "rename progress");
        self.state = next;
    }
}

pub fn rename_group<S>(
    store: &S,
    paths: &OffsetPaths,
    catalog: &TopicCatalog,
    confirm: &mut dyn Confirm,
    old_group: &str,
    new_group: &str
) -> Result<MigrationReport>
    where S: CoordinationStore + ?Sized
{
    check_group_ids(old_group, new_group)?;
    let mut progress = Progress {
        state: MigrationState::Start,
        old_group,
        new_group
    };

    let migrator = OffsetMigrator::new(store, paths, old_group, new_group);
    let cleanup_only = migrator.pending_retire()?;

    let (source, destination) = if cleanup_only {
        info!(old_group, new_group, "offsets were already copied; finishing removal of the old group");
        (GroupTopology::new(), DestinationGroup::default())
    } else {
        let source = read_group_topology(store, paths, catalog, old_group)?;
        let destination = DestinationGroup::inspect(store, paths, old_group, new_group, &source)?;
        (source, destination)
    };
    progress.advance(MigrationState::TopologyResolved);

    debug!(group = new_group, exists = destination.exists(), resumed = destination.resumed.len(), "inspected new group");
    let conflicts = conflicting_topics(&source, &destination);
    if !conflicts.is_empty() {
        return Err(RenameError::Conflict {
            group: new_group.to_string(),
            topics: conflicts
        });
    }
    progress.advance(MigrationState::ConflictsChecked);

    let own_topics = destination.own_topics();
    let merged = !own_topics.is_empty();
    if merged || !destination.resumed.is_empty() {
        let question = gate_question(old_group, &source.topic_set(), new_group, &own_topics, &destination.resumed);
        let confirmed = confirm.confirm(&question).unwrap_or_else(|e| {
            warn!(error = %e, "unable to read confirmation");
            false
        });
        if !confirmed {
            return Err(RenameError::Cancelled {
                old_group: old_group.to_string(),
                new_group: new_group.to_string()
            });
        }
        progress.advance(MigrationState::Confirmed);
    } else {
        progress.advance(MigrationState::SkippedConfirmation);
    }

    let offsets = migrator.read_offsets(&source)?;
    progress.advance(MigrationState::OffsetsRead);

    migrator.write_offsets(&offsets, &destination.resumed)?;
    progress.advance(MigrationState::OffsetsWritten);

    migrator.retire_source()?;
    progress.advance(MigrationState::SourceRetired);

    info!(old_group, new_group, partitions = offsets.len(), merged, "renamed consumer group");
    Ok(MigrationReport {
        old_group: old_group.to_string(),
        new_group: new_group.to_string(),
        topics: source.topics().map(String::from).collect(),
        partitions: offsets.len(),
        resumed: destination.resumed.into_iter().collect(),
        merged,
        cleanup_only,
        state: progress.state
    })
}
