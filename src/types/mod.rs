//! Data model of the replay engine: node identities, checkpoints and histories.
//!
//! Checkpoints are shared as `Arc<Checkpoint>` once recorded and are never
//! mutated afterwards.

mod checkpoint;
mod node_history;
mod node_id;
#[cfg(test)]
mod node_id_test;
mod node_status;
mod shared_store;
#[cfg(test)]
mod shared_store_test;
mod timeline_entry;

pub use checkpoint::{Checkpoint, now_unix_seconds};
pub use node_history::NodeHistory;
pub use node_id::{NodeId, SCOPE_SEPARATOR};
pub use node_status::NodeStatus;
pub use shared_store::{SharedStore, StoreMap};
pub use timeline_entry::TimelineEntry;
