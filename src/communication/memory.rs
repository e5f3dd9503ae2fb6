//! In-memory vehicle link
//!
//! Stores collections the way a vehicle would and answers link requests
//! after an optional latency. Failures can be injected per operation to
//! exercise error paths.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use trail_planner_core::home::HomePosition;
use trail_planner_core::mission::{MissionItem, MissionType};

use super::link::{MissionControl, ProgressReporter, VehicleLink};
use crate::error::{PlannerError, Result};

#[derive(Debug, Default)]
struct MemoryVehicle {
    collections: [Vec<MissionItem>; 3],
    home: Option<HomePosition>,
    controls: Vec<MissionControl>,
    fail_writes: usize,
    fail_reads: usize,
    writes: usize,
}

/// Simulated vehicle.
#[derive(Debug, Default)]
pub struct MemoryLink {
    vehicle: Mutex<MemoryVehicle>,
    latency: Duration,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to every operation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_home(self, home: HomePosition) -> Self {
        self.state().home = Some(home);
        self
    }

    pub fn with_collection(self, mission_type: MissionType, items: Vec<MissionItem>) -> Self {
        self.state().collections[mission_type.index()] = items;
        self
    }

    /// Make the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.state().fail_writes = count;
    }

    /// Make the next `count` reads fail.
    pub fn fail_next_reads(&self, count: usize) {
        self.state().fail_reads = count;
    }

    /// Collection currently stored on the simulated vehicle.
    pub fn stored(&self, mission_type: MissionType) -> Vec<MissionItem> {
        self.state().collections[mission_type.index()].clone()
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Control requests received so far.
    pub fn controls(&self) -> Vec<MissionControl> {
        self.state().controls.clone()
    }

    pub fn set_home(&self, home: Option<HomePosition>) {
        self.state().home = home;
    }

    fn state(&self) -> MutexGuard<'_, MemoryVehicle> {
        self.vehicle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl VehicleLink for MemoryLink {
    async fn get_current_mission(
        &self,
        mission_type: MissionType,
        progress: &ProgressReporter,
    ) -> Result<Vec<MissionItem>> {
        self.delay().await;
        let items = {
            let mut state = self.state();
            if state.fail_reads > 0 {
                state.fail_reads -= 1;
                return Err(PlannerError::Timeout("MISSION_COUNT"));
            }
            state.collections[mission_type.index()].clone()
        };
        let total = items.len() as u16;
        for index in 0..total {
            progress.report(mission_type, index + 1, total);
        }
        debug!("Memory vehicle returned {} {} items", total, mission_type);
        Ok(items)
    }

    async fn write_current_mission(
        &self,
        mission_type: MissionType,
        items: &[MissionItem],
        progress: &ProgressReporter,
    ) -> Result<()> {
        let total = items.len() as u16;
        for index in 0..total {
            progress.report(mission_type, index + 1, total);
        }
        self.delay().await;

        let mut state = self.state();
        if state.fail_writes > 0 {
            state.fail_writes -= 1;
            return Err(PlannerError::VehicleRejected {
                operation: "mission write",
                reason: "injected failure".to_string(),
            });
        }
        state.collections[mission_type.index()] = items.to_vec();
        state.writes += 1;
        debug!("Memory vehicle stored {} {} items", total, mission_type);
        Ok(())
    }

    async fn get_home_position(&self) -> Result<HomePosition> {
        self.delay().await;
        self.state()
            .home
            .ok_or(PlannerError::Timeout("HOME_POSITION"))
    }

    async fn control_mission(&self, control: MissionControl) -> Result<()> {
        self.delay().await;
        let mut state = self.state();
        if state.collections[MissionType::Mission.index()].is_empty() {
            return Err(PlannerError::VehicleRejected {
                operation: "mission start",
                reason: "no mission".to_string(),
            });
        }
        state.controls.push(control);
        Ok(())
    }
}
