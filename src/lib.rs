//! trail_planner - Mission planning and vehicle sync for MAVLink ground control
//!
//! This library is the host layer on top of [`trail_planner_core`]: it owns
//! the vehicle link, the async sync tracker, plan files, configuration and
//! the operator-facing [`session::PlanSession`].

pub use trail_planner_core as planning;

// Error types shared by every host module
pub mod error;

// Link and transfer settings
pub mod config;

// QGC WPL 110 plan files
pub mod plan_file;

// Vehicle links (MAVLink, in-memory)
pub mod communication;

// Per-collection write/read tracking
pub mod sync;

// Operator-facing planning state
pub mod session;

pub use communication::{MemoryLink, MissionControl, ProgressReporter, VehicleLink};
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use session::PlanSession;
pub use sync::SyncTracker;
