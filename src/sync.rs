//! Sync Tracker
//!
//! Async driver around the per-collection [`SyncState`] bookkeeping. Each
//! collection has its own state; a write or read is refused while another
//! operation on the same collection is outstanding, while different
//! collections proceed independently.
//!
//! State lives behind a `std::sync::Mutex` that is only held for the
//! bookkeeping transitions, never across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use trail_planner_core::mission::{MissionItem, MissionType};
use trail_planner_core::sync::{SyncError, SyncPhase, SyncState};

use crate::communication::{ProgressReporter, VehicleLink};
use crate::error::Result;

/// Tracks unwritten changes and confirmed copies for all collections.
pub struct SyncTracker<L> {
    link: Arc<L>,
    states: Mutex<[SyncState; 3]>,
}

impl<L: VehicleLink> SyncTracker<L> {
    pub fn new(link: Arc<L>) -> Self {
        Self {
            link,
            states: Mutex::new(MissionType::ALL.map(SyncState::new)),
        }
    }

    pub fn link(&self) -> &Arc<L> {
        &self.link
    }

    /// Record a local edit of a collection.
    pub fn mark_dirty(&self, mission_type: MissionType) {
        self.states()[mission_type.index()].mark_dirty();
    }

    pub fn has_unwritten_changes(&self, mission_type: MissionType) -> bool {
        self.states()[mission_type.index()].has_unwritten_changes()
    }

    /// Last copy known to match the vehicle.
    pub fn confirmed(&self, mission_type: MissionType) -> Vec<MissionItem> {
        self.states()[mission_type.index()].confirmed().to_vec()
    }

    pub fn phase(&self, mission_type: MissionType) -> SyncPhase {
        self.states()[mission_type.index()].phase()
    }

    /// Write `items` to the vehicle.
    ///
    /// Does nothing when the collection has no unwritten changes. On success
    /// `items` becomes the confirmed copy and the unwritten changes flag
    /// clears (unless the collection was edited meanwhile). On failure both
    /// are left untouched.
    pub async fn write(
        &self,
        mission_type: MissionType,
        items: Vec<MissionItem>,
        progress: &ProgressReporter,
    ) -> Result<()> {
        if !self.has_unwritten_changes(mission_type) {
            debug!("{} has no unwritten changes, skipping write", mission_type);
            return Ok(());
        }
        let ticket = self.begin(mission_type, |state| state.begin_write())?;
        let in_flight = InFlight::new(self, mission_type);
        debug!("{} write started: {} items", mission_type, items.len());

        let result = self
            .link
            .write_current_mission(mission_type, &items, progress)
            .await;
        in_flight.disarm();

        match result {
            Ok(()) => {
                self.states()[mission_type.index()].finish_write(ticket, items)?;
                info!("{} written to vehicle", mission_type);
                Ok(())
            }
            Err(e) => {
                self.states()[mission_type.index()].fail_write()?;
                warn!("{} write failed: {}", mission_type, e);
                Err(e)
            }
        }
    }

    /// Read a collection from the vehicle.
    ///
    /// The result always becomes the confirmed copy; callers that care about
    /// unwritten local changes must check [`Self::has_unwritten_changes`]
    /// first.
    pub async fn read(
        &self,
        mission_type: MissionType,
        progress: &ProgressReporter,
    ) -> Result<Vec<MissionItem>> {
        self.begin(mission_type, |state| state.begin_read())?;
        let in_flight = InFlight::new(self, mission_type);
        debug!("{} read started", mission_type);

        let result = self.link.get_current_mission(mission_type, progress).await;
        in_flight.disarm();

        match result {
            Ok(items) => {
                self.states()[mission_type.index()].finish_read(items.clone())?;
                info!("{} read from vehicle: {} items", mission_type, items.len());
                Ok(items)
            }
            Err(e) => {
                self.states()[mission_type.index()].fail_read()?;
                warn!("{} read failed: {}", mission_type, e);
                Err(e)
            }
        }
    }

    fn begin<R>(
        &self,
        mission_type: MissionType,
        f: impl FnOnce(&mut SyncState) -> std::result::Result<R, SyncError>,
    ) -> Result<R> {
        f(&mut self.states()[mission_type.index()]).map_err(|e| {
            warn!("{} sync refused: {}", mission_type, e);
            e.into()
        })
    }

    fn states(&self) -> MutexGuard<'_, [SyncState; 3]> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns a collection to idle if its operation is dropped mid-flight.
struct InFlight<'a, L: VehicleLink> {
    tracker: &'a SyncTracker<L>,
    mission_type: MissionType,
    armed: bool,
}

impl<'a, L: VehicleLink> InFlight<'a, L> {
    fn new(tracker: &'a SyncTracker<L>, mission_type: MissionType) -> Self {
        Self {
            tracker,
            mission_type,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<L: VehicleLink> Drop for InFlight<'_, L> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut states = self.tracker.states();
        let state = &mut states[self.mission_type.index()];
        let _ = match state.phase() {
            SyncPhase::Writing => state.fail_write(),
            SyncPhase::Reading => state.fail_read(),
            SyncPhase::Idle => Ok(()),
        };
        warn!("{} transfer cancelled", self.mission_type);
    }
}
