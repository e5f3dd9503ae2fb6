//! Home Position Reconciler
//!
//! The planned home position is only ever changed through this state
//! machine:
//!
//! ```text
//! Idle --propose--> Pending(candidate) --accept--> Idle (planned = candidate)
//!                                      --reject--> Idle (planned unchanged)
//! ```
//!
//! A candidate proposed while another is pending replaces it; the older one
//! is implicitly rejected.

pub mod diff;

use alloc::string::String;
use core::fmt;

use crate::mission::{MissionCommand, MissionFrame, MissionItem};
use crate::navigation::GeoPoint;

pub use diff::{divergence_index, FieldDiff, HomeDiff};

/// Home position in item units (degrees * 1e7, meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomePosition {
    pub lat: i32,
    pub lon: i32,
    pub alt: f32,
}

impl HomePosition {
    pub fn new(lat: i32, lon: i32, alt: f32) -> Self {
        Self { lat, lon, alt }
    }

    /// Build from degrees, rounding to the nearest 1e-7 degree.
    pub fn from_degrees(latitude: f64, longitude: f64, alt: f32) -> Self {
        Self {
            lat: libm::round(latitude * 1e7) as i32,
            lon: libm::round(longitude * 1e7) as i32,
            alt,
        }
    }

    /// Read a home placeholder item.
    pub fn from_item(item: &MissionItem) -> Self {
        Self::new(item.x, item.y, item.z)
    }

    /// Home placeholder item (waypoint, absolute global frame).
    pub fn to_item(&self) -> MissionItem {
        MissionItem::new(MissionCommand::Waypoint, self.lat, self.lon, self.alt)
            .with_frame(MissionFrame::Global)
    }

    pub fn latitude(&self) -> f64 {
        self.lat as f64 / 1e7
    }

    pub fn longitude(&self) -> f64 {
        self.lon as f64 / 1e7
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::from_scaled(self.lat, self.lon)
    }

    /// False when either coordinate is zero.
    pub fn has_coordinate(&self) -> bool {
        self.lat != 0 && self.lon != 0
    }
}

/// Where a candidate home came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeSource {
    /// Plan file, with its display name
    File(String),
    /// Fresh vehicle read
    Vehicle,
    /// Operator moved the home marker
    Operator,
}

impl fmt::Display for HomeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomeSource::File(name) => write!(f, "file {}", name),
            HomeSource::Vehicle => write!(f, "vehicle"),
            HomeSource::Operator => write!(f, "operator"),
        }
    }
}

/// Home position waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeCandidate {
    pub position: HomePosition,
    pub from: HomeSource,
}

impl HomeCandidate {
    pub fn new(position: HomePosition, from: HomeSource) -> Self {
        Self { position, from }
    }
}

/// Reconciler state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReconcileState {
    #[default]
    Idle,
    Pending(HomeCandidate),
}

/// Errors from reconciler transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileError {
    /// accept/reject called with no pending candidate
    NoPendingCandidate,
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::NoPendingCandidate => write!(f, "no home candidate pending"),
        }
    }
}

/// Guards the planned home position.
#[derive(Debug, Clone, Default)]
pub struct HomeReconciler {
    planned: Option<HomePosition>,
    state: ReconcileState,
}

impl HomeReconciler {
    /// Create a reconciler with no planned home
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planned(&self) -> Option<&HomePosition> {
        self.planned.as_ref()
    }

    pub fn state(&self) -> &ReconcileState {
        &self.state
    }

    pub fn pending(&self) -> Option<&HomeCandidate> {
        match &self.state {
            ReconcileState::Pending(candidate) => Some(candidate),
            ReconcileState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Stage a candidate, returning the candidate it superseded.
    pub fn propose(&mut self, candidate: HomeCandidate) -> Option<HomeCandidate> {
        match core::mem::replace(&mut self.state, ReconcileState::Pending(candidate)) {
            ReconcileState::Pending(previous) => Some(previous),
            ReconcileState::Idle => None,
        }
    }

    /// Compare the pending candidate against the planned home.
    pub fn diff(&self) -> Option<HomeDiff> {
        self.pending()
            .map(|candidate| HomeDiff::compute(self.planned.as_ref(), &candidate.position))
    }

    /// Replace the planned home with the pending candidate.
    pub fn accept(&mut self) -> Result<HomePosition, ReconcileError> {
        match core::mem::take(&mut self.state) {
            ReconcileState::Pending(candidate) => {
                self.planned = Some(candidate.position);
                Ok(candidate.position)
            }
            ReconcileState::Idle => Err(ReconcileError::NoPendingCandidate),
        }
    }

    /// Discard the pending candidate.
    pub fn reject(&mut self) -> Result<HomeCandidate, ReconcileError> {
        match core::mem::take(&mut self.state) {
            ReconcileState::Pending(candidate) => Ok(candidate),
            ReconcileState::Idle => Err(ReconcileError::NoPendingCandidate),
        }
    }
}
