//! Policy snapshot persistence.

pub mod checkpointer;

pub use checkpointer::{
    CheckpointConfig, CheckpointError, Checkpointer, SnapshotInfo,
};
