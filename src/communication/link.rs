use async_trait::async_trait;
use tokio::sync::mpsc;
use trail_planner_core::home::HomePosition;
use trail_planner_core::mission::{MissionItem, MissionType};
use trail_planner_core::sync::TransferProgress;

use crate::error::Result;

/// Mission execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionControl {
    /// Start (or resume) the uploaded mission
    Start,
    /// Rewind to the first item, then start
    Restart,
}

/// Advisory progress sink for reads and writes.
///
/// Reports are dropped when nobody listens.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<TransferProgress>>,
}

impl ProgressReporter {
    /// Reporter that discards everything.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(tx: mpsc::UnboundedSender<TransferProgress>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Reporter plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransferProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn report(&self, mission_type: MissionType, current_index: u16, total_items: u16) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(TransferProgress {
                mission_type,
                current_index,
                total_items,
            });
        }
    }
}

/// Connection to one vehicle.
///
/// Implementations must be usable from several tasks at once; operations on
/// different collections may be issued concurrently.
#[async_trait]
pub trait VehicleLink: Send + Sync {
    /// Download the vehicle's copy of a collection.
    async fn get_current_mission(
        &self,
        mission_type: MissionType,
        progress: &ProgressReporter,
    ) -> Result<Vec<MissionItem>>;

    /// Replace the vehicle's copy of a collection.
    async fn write_current_mission(
        &self,
        mission_type: MissionType,
        items: &[MissionItem],
        progress: &ProgressReporter,
    ) -> Result<()>;

    /// Query the vehicle's home position.
    async fn get_home_position(&self) -> Result<HomePosition>;

    async fn control_mission(&self, control: MissionControl) -> Result<()>;
}
