//! Vehicle Communication
//!
//! This module provides the vehicle link abstraction used by the sync
//! tracker and plan session, plus its implementations.
//!
//! # Links
//!
//! - **MAVLink 2.0** ([`mavlink::MavlinkLink`]): mission micro-protocol client
//!   over a pluggable transport (UDP by default)
//! - **In-memory** ([`memory::MemoryLink`]): simulated vehicle for offline use
//!   and tests

pub mod link;
pub mod mavlink;
pub mod memory;

pub use link::{MissionControl, ProgressReporter, VehicleLink};
pub use memory::MemoryLink;
