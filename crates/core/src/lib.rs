//! trail_planner_core - Pure no_std planning logic for trail_planner
//!
//! This crate contains the platform-agnostic mission planning model and
//! algorithms. It performs no I/O and holds no clocks, so everything here
//! can be tested on host without a vehicle or network.
//!
//! # Design Principles
//!
//! - **Pure no_std**: only `core` and `alloc`
//! - **Deterministic**: same items in, same results out
//! - **Raw collections are never mutated** by derived views
//!
//! # Modules
//!
//! - [`mission`]: Item model, editable collections, filter and validation
//! - [`fence`]: Fence polygon and circle classification
//! - [`path`]: Jump-aware path and distance resolution
//! - [`statistics`]: Derived mission statistics
//! - [`home`]: Home position reconciliation and field diff
//! - [`navigation`]: Great-circle distance helpers
//! - [`sync`]: Per-collection sync bookkeeping

#![no_std]

extern crate alloc;

pub mod fence;
pub mod home;
pub mod mission;
pub mod navigation;
pub mod path;
pub mod statistics;
pub mod sync;

pub use fence::{classify_fence, FenceShapes};
pub use home::{HomeCandidate, HomePosition, HomeReconciler, HomeSource};
pub use mission::{filter_items, ItemCollection, MissionCommand, MissionItem, MissionType};
pub use path::{resolve_path, resolve_total_distance, MissionPath};
pub use statistics::MissionStatistics;
pub use sync::{SyncError, SyncPhase, SyncState, TransferProgress};
