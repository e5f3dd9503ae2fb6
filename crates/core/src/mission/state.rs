//! Mission State Types
//!
//! Vehicle-reported execution state. These values are authoritative only:
//! they are set from the vehicle's progress stream and never edited locally.

/// Mission execution phase as reported by the vehicle (MISSION_STATE)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissionState {
    /// Vehicle has not reported a state
    #[default]
    Unknown,
    /// No mission stored on the vehicle
    NoMission,
    /// Mission stored but not started
    NotStarted,
    /// Mission running
    Active,
    /// Mission paused mid-way
    Paused,
    /// All items executed
    Complete,
}

impl MissionState {
    /// Decode the MAVLink MISSION_STATE value.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => MissionState::NoMission,
            2 => MissionState::NotStarted,
            3 => MissionState::Active,
            4 => MissionState::Paused,
            5 => MissionState::Complete,
            _ => MissionState::Unknown,
        }
    }
}

/// One progress update from the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MissionProgress {
    pub state: MissionState,
    /// Sequence number of the item being executed
    pub current_seq: u16,
    /// Number of items in the vehicle's mission
    pub total: u16,
}

/// Vehicle-side view of the mission execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Mission {
    progress: MissionProgress,
}

impl Mission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a progress update received from the vehicle.
    pub fn apply_progress(&mut self, progress: MissionProgress) {
        self.progress = progress;
    }

    pub fn state(&self) -> MissionState {
        self.progress.state
    }

    pub fn current_seq(&self) -> u16 {
        self.progress.current_seq
    }

    pub fn total(&self) -> u16 {
        self.progress.total
    }

    pub fn progress(&self) -> MissionProgress {
        self.progress
    }
}
