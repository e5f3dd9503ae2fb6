//! Plan Session
//!
//! Owns everything the operator edits: the three drawing copies, the home
//! reconciler, the vehicle-reported home and mission progress, plus the
//! sync tracker that moves collections to and from the vehicle.
//!
//! Edits go through [`PlanSession::edit`], which marks the collection dirty.
//! The planned home only changes by accepting a staged candidate.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use trail_planner_core::fence::{classify_fence, FenceShapes};
use trail_planner_core::home::{
    HomeCandidate, HomeDiff, HomePosition, HomeReconciler, HomeSource,
};
use trail_planner_core::mission::{
    filter_items, is_home_placeholder, validate_items, CollectionError, ItemCollection, Mission,
    MissionIssue, MissionItem, MissionProgress, MissionType,
};
use trail_planner_core::path::{resolve_path, unresolved_jumps, MissionPath};
use trail_planner_core::statistics::MissionStatistics;

use crate::communication::{MissionControl, ProgressReporter, VehicleLink};
use crate::error::Result;
use crate::plan_file::{export_mission_to_file, import_mission_from_file};
use crate::sync::SyncTracker;

/// Operator-facing planning state for one vehicle.
pub struct PlanSession<L> {
    collections: [ItemCollection; 3],
    reconciler: HomeReconciler,
    vehicle_home: Option<HomePosition>,
    mission: Mission,
    tracker: SyncTracker<L>,
}

impl<L: VehicleLink> PlanSession<L> {
    pub fn new(link: Arc<L>) -> Self {
        Self {
            collections: MissionType::ALL.map(ItemCollection::new),
            reconciler: HomeReconciler::new(),
            vehicle_home: None,
            mission: Mission::new(),
            tracker: SyncTracker::new(link),
        }
    }

    /// Drawing copy of a collection.
    pub fn collection(&self, mission_type: MissionType) -> &ItemCollection {
        &self.collections[mission_type.index()]
    }

    pub fn items(&self, mission_type: MissionType) -> &[MissionItem] {
        self.collection(mission_type).items()
    }

    pub fn tracker(&self) -> &SyncTracker<L> {
        &self.tracker
    }

    pub fn reconciler(&self) -> &HomeReconciler {
        &self.reconciler
    }

    pub fn planned_home(&self) -> Option<&HomePosition> {
        self.reconciler.planned()
    }

    /// Last home reported by the vehicle.
    pub fn vehicle_home(&self) -> Option<&HomePosition> {
        self.vehicle_home.as_ref()
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn has_unwritten_changes(&self, mission_type: MissionType) -> bool {
        self.tracker.has_unwritten_changes(mission_type)
    }

    /// Apply an operator edit to a collection.
    ///
    /// The collection is marked dirty only when `f` succeeds.
    pub fn edit<R, F>(&mut self, mission_type: MissionType, f: F) -> Result<R>
    where
        F: FnOnce(&mut ItemCollection) -> std::result::Result<R, CollectionError>,
    {
        let result = f(&mut self.collections[mission_type.index()])?;
        self.tracker.mark_dirty(mission_type);
        Ok(result)
    }

    /// Record a mission progress report from the vehicle stream.
    pub fn apply_progress(&mut self, progress: MissionProgress) {
        self.mission.apply_progress(progress);
    }

    pub fn statistics(&self) -> MissionStatistics {
        let raw = self.items(MissionType::Mission);
        self.log_unresolved_jumps(raw);
        MissionStatistics::compute(raw, self.reconciler.planned())
    }

    pub fn mission_path(&self) -> MissionPath {
        let raw = self.items(MissionType::Mission);
        self.log_unresolved_jumps(raw);
        resolve_path(&filter_items(raw), raw)
    }

    pub fn fence_shapes(&self) -> FenceShapes {
        let shapes = classify_fence(self.items(MissionType::Fence));
        let open = shapes.polygons.len() - shapes.complete_polygons().count();
        if open > 0 {
            warn!("Fence has {} incomplete polygon(s)", open);
        }
        shapes
    }

    pub fn validate(&self, mission_type: MissionType) -> Vec<MissionIssue> {
        validate_items(mission_type, self.items(mission_type))
    }

    /// Load a plan file into a collection, replacing its items.
    ///
    /// A home placeholder in a mission file is staged as a home candidate.
    pub fn import_file(&mut self, mission_type: MissionType, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let items = import_mission_from_file(mission_type, path)?;
        if mission_type == MissionType::Mission {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            self.stage_placeholder(&items, HomeSource::File(name));
        }
        self.adopt(mission_type, items);
        self.tracker.mark_dirty(mission_type);
        Ok(())
    }

    pub fn export_file(&self, mission_type: MissionType, path: impl AsRef<Path>) -> Result<()> {
        export_mission_to_file(mission_type, path, self.items(mission_type))
    }

    /// Write a collection's drawing copy to the vehicle.
    ///
    /// Validation findings are logged; the vehicle has the final say.
    pub async fn write(&self, mission_type: MissionType, progress: &ProgressReporter) -> Result<()> {
        let items = self.items(mission_type).to_vec();
        for issue in validate_items(mission_type, &items) {
            warn!("{} item {:?}: {} ({})", mission_type, issue.seq, issue.message, issue.code);
        }
        self.tracker.write(mission_type, items, progress).await
    }

    /// Replace a collection's drawing copy with the vehicle's copy.
    ///
    /// Unwritten local changes are overwritten; check
    /// [`Self::has_unwritten_changes`] first.
    pub async fn read(&mut self, mission_type: MissionType, progress: &ProgressReporter) -> Result<()> {
        if self.tracker.has_unwritten_changes(mission_type) {
            warn!("Discarding unwritten {} changes", mission_type);
        }
        let items = self.tracker.read(mission_type, progress).await?;
        if mission_type == MissionType::Mission {
            self.stage_placeholder(&items, HomeSource::Vehicle);
        }
        self.adopt(mission_type, items);
        Ok(())
    }

    fn adopt(&mut self, mission_type: MissionType, items: Vec<MissionItem>) {
        let total = items.len();
        let adopted = self.collections[mission_type.index()].replace_all(items);
        if adopted < total {
            warn!(
                "{} has {} items, only the first {} were loaded",
                mission_type, total, adopted
            );
        }
    }

    /// Query the vehicle home and stage it as a candidate when it differs
    /// from the planned home.
    pub async fn refresh_home(&mut self) -> Result<HomePosition> {
        let home = self.tracker.link().get_home_position().await?;
        self.vehicle_home = Some(home);
        self.propose_home(home, HomeSource::Vehicle);
        Ok(home)
    }

    /// Stage a home candidate; returns false when it matches the planned home.
    pub fn propose_home(&mut self, position: HomePosition, from: HomeSource) -> bool {
        if self.reconciler.planned() == Some(&position) {
            return false;
        }
        info!(
            "Home candidate from {}: {:.7}, {:.7}, {:.2} m",
            from,
            position.latitude(),
            position.longitude(),
            position.alt
        );
        if let Some(superseded) = self.reconciler.propose(HomeCandidate::new(position, from)) {
            info!("Home candidate from {} superseded", superseded.from);
        }
        true
    }

    /// Field diff of the pending candidate against the planned home.
    pub fn home_diff(&self) -> Option<HomeDiff> {
        self.reconciler.diff()
    }

    /// Adopt the pending candidate as the planned home.
    ///
    /// A mission home placeholder follows the new home.
    pub fn accept_home(&mut self) -> Result<HomePosition> {
        let home = self.reconciler.accept()?;
        let mission = &mut self.collections[MissionType::Mission.index()];
        if is_home_placeholder(mission.items()) {
            let id = mission.items()[0].id;
            mission.update(id, |item| {
                item.x = home.lat;
                item.y = home.lon;
                item.z = home.alt;
            })?;
            self.tracker.mark_dirty(MissionType::Mission);
        }
        info!("Planned home set to {:.7}, {:.7}", home.latitude(), home.longitude());
        Ok(home)
    }

    pub fn reject_home(&mut self) -> Result<HomeCandidate> {
        let candidate = self.reconciler.reject()?;
        info!("Home candidate from {} rejected", candidate.from);
        Ok(candidate)
    }

    pub async fn control_mission(&self, control: MissionControl) -> Result<()> {
        self.tracker.link().control_mission(control).await
    }

    fn stage_placeholder(&mut self, items: &[MissionItem], from: HomeSource) {
        if is_home_placeholder(items) {
            let placeholder = HomePosition::from_item(&items[0]);
            if placeholder.has_coordinate() {
                self.propose_home(placeholder, from);
            }
        }
    }

    fn log_unresolved_jumps(&self, raw: &[MissionItem]) {
        for jump in unresolved_jumps(raw) {
            warn!(
                "Jump {} targets item {} which does not precede it",
                jump.seq, jump.param1
            );
        }
    }
}
