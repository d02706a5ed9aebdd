//! Core pipeline logic.

pub mod indexer;
pub mod pipeline;
pub mod prober;
pub mod report;
pub mod searcher;
pub mod store;
pub mod synchronizer;

pub use pipeline::{Pipeline, PipelineConfig, RunInput};
pub use store::{JsonSnapshotStore, RunLock, SnapshotStore};
