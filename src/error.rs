use crate::store::StoreError;
use itertools::join;
use std::error::Error as StdError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenameError>;

/// Everything that can stop a group rename. The variants fall into two
/// camps: the ones raised before the first store mutation, and the write and
/// retire failures that leave the store changed.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("{0}")]
    Usage(String),

    #[error("Consumer Group ID {0} does not exist.")]
    GroupNotFound(String),

    #[error("Consumer Group ID: {group} is already subscribed to topic(s): {}.\nPlease delete these topics from either group before re-running the command.", join(.topics, ", "))]
    Conflict {
        group: String,
        topics: Vec<String>
    },

    #[error("Consumer Group ID {old_group} was already copied to {renamed_to}, but its removal did not finish.\nPlease re-run the rename to {renamed_to} to complete it.")]
    AlreadyRenamed {
        old_group: String,
        renamed_to: String
    },

    #[error("Merging {old_group} into {new_group} was cancelled.")]
    Cancelled {
        old_group: String,
        new_group: String
    },

    #[error("Unable to read offsets of consumer group {group}: {source}")]
    StoreRead {
        group: String,
        #[source]
        source: StoreError
    },

    #[error("Offset stored at {path} is not a non-negative integer: {payload:?}")]
    BadOffset {
        path: String,
        payload: String
    },

    #[error("Unable to {what}: {source}")]
    Bootstrap {
        what: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>
    },

    #[error("Unable to migrate all metadata in Zookeeper: {source}")]
    StoreWrite {
        new_group: String,
        #[source]
        source: StoreError
    },

    #[error("Offsets were copied to {new_group}, but {old_group} could not be fully removed: {source}")]
    StoreRetire {
        old_group: String,
        new_group: String,
        #[source]
        source: StoreError
    }
}

impl RenameError {
    pub fn bootstrap<E>(what: &str, source: E) -> RenameError
        where E: Into<Box<dyn StdError + Send + Sync>>
    {
        RenameError::Bootstrap {
            what: what.to_string(),
            source: source.into()
        }
    }

    /// True when the run stopped before touching the store.
    pub fn store_untouched(&self) -> bool {
        !matches!(self, RenameError::StoreWrite { .. } | RenameError::StoreRetire { .. })
    }

    pub fn recovery_hint(&self) -> String {
        match self {
            RenameError::StoreWrite { new_group, .. } => format!(
                "{} may hold some of the migrated offsets; the old group is untouched. Please re-run the command.",
                new_group),
            RenameError::StoreRetire { new_group, .. } => format!(
                "{} holds every migrated offset; only the cleanup is incomplete. Please re-run the command.",
                new_group),
            _ => {
                debug_assert!(self.store_untouched());
                "Nothing was changed.".to_string()
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RenameError::GroupNotFound(_)
            | RenameError::Conflict { .. }
            | RenameError::AlreadyRenamed { .. }
            | RenameError::StoreRead { .. }
            | RenameError::BadOffset { .. }
            | RenameError::Bootstrap { .. } => 1,
            RenameError::Usage(_) => 2,
            RenameError::Cancelled { .. } => 3,
            RenameError::StoreWrite { .. } => 4,
            RenameError::StoreRetire { .. } => 5
        }
    }
}
