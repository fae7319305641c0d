//! # streamweave-replay
//!
//! Checkpoint-based record and replay for workflow steps.
//!
//! ## Architecture
//!
//! - [StateManager]: lock-guarded registry of append-only node histories for one
//!   session, with JSON export/import and file persistence.
//! - [Recordable]: wraps a node callable. A call either replays the node's
//!   latest checkpoint (output plus shared-store contents) or runs the callable
//!   and records a new checkpoint.
//! - [codec] / [checkpoint_io]: the persisted document and its file I/O.
//! - [global]: default manager for the outermost application layer.
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use streamweave_replay::{Recordable, SharedStore, StateManager};
//!
//! let manager = Arc::new(StateManager::new());
//! let step = Recordable::new(Arc::clone(&manager), "flow::enrich", |store: SharedStore| {
//!   store.insert("enriched", true);
//!   Ok::<_, Infallible>(store.len())
//! })
//! .with_shared_state(|store: &SharedStore| Some(store.clone()));
//!
//! let first = step.call(SharedStore::new()).unwrap();
//! let replayed = step.call(SharedStore::new()).unwrap();
//! assert_eq!(first, replayed);
//! manager.persist_to_file("replay_state.json").unwrap();
//! ```

pub mod capture;
pub mod checkpoint_io;
pub mod codec;
pub mod config;
pub mod cpu_clock;
pub mod error;
pub mod global;
pub mod recordable;
pub mod state_manager;
pub mod types;

pub use capture::Opaque;
pub use checkpoint_io::STATE_FILENAME;
pub use codec::StateDocument;
pub use config::ReplayMode;
pub use error::ReplayError;
pub use global::{default_manager, recordable};
pub use recordable::{Invocation, Recordable};
pub use state_manager::StateManager;
pub use types::{Checkpoint, NodeHistory, NodeId, NodeStatus, SharedStore, StoreMap, TimelineEntry};
