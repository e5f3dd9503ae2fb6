//! Collection Sync State
//!
//! Pure bookkeeping for one collection's round trips with the vehicle:
//! the "unwritten changes" flag, the confirmed copy (last collection known
//! to match the vehicle) and the in-flight operation guard.
//!
//! The host crate drives the actual transfers; this module only decides
//! whether an operation may start and what its completion does.

use alloc::vec::Vec;
use core::fmt;

use crate::mission::{MissionItem, MissionType};

/// Operation currently in flight for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Writing,
    Reading,
}

/// Errors from sync transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Another read or write for this collection is outstanding
    Busy {
        mission_type: MissionType,
        phase: SyncPhase,
    },
    /// Completion reported without a matching start
    NotInProgress(MissionType),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Busy {
                mission_type,
                phase,
            } => write!(f, "{} transfer already in progress ({:?})", mission_type, phase),
            SyncError::NotInProgress(mission_type) => {
                write!(f, "no {} transfer in progress", mission_type)
            }
        }
    }
}

/// Progress of a read or write, advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub mission_type: MissionType,
    pub current_index: u16,
    pub total_items: u16,
}

/// Ticket returned by [`SyncState::begin_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTicket {
    revision: u64,
}

/// Sync state of one collection.
#[derive(Debug, Clone)]
pub struct SyncState {
    mission_type: MissionType,
    has_unwritten_changes: bool,
    phase: SyncPhase,
    confirmed: Vec<MissionItem>,
    /// Bumped on every local edit
    revision: u64,
}

impl SyncState {
    pub fn new(mission_type: MissionType) -> Self {
        Self {
            mission_type,
            has_unwritten_changes: false,
            phase: SyncPhase::Idle,
            confirmed: Vec::new(),
            revision: 0,
        }
    }

    pub fn mission_type(&self) -> MissionType {
        self.mission_type
    }

    pub fn has_unwritten_changes(&self) -> bool {
        self.has_unwritten_changes
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Last collection known to match the vehicle.
    pub fn confirmed(&self) -> &[MissionItem] {
        &self.confirmed
    }

    /// Record a local structural or field edit.
    pub fn mark_dirty(&mut self) {
        self.has_unwritten_changes = true;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Start a write. Fails while any operation on this collection is in flight.
    pub fn begin_write(&mut self) -> Result<WriteTicket, SyncError> {
        self.ensure_idle()?;
        self.phase = SyncPhase::Writing;
        Ok(WriteTicket {
            revision: self.revision,
        })
    }

    /// Complete a successful write of `items`.
    ///
    /// The dirty flag is cleared only when no edit happened since the write
    /// started; later edits are not on the vehicle yet.
    pub fn finish_write(
        &mut self,
        ticket: WriteTicket,
        items: Vec<MissionItem>,
    ) -> Result<(), SyncError> {
        self.ensure_phase(SyncPhase::Writing)?;
        self.phase = SyncPhase::Idle;
        self.confirmed = items;
        if self.revision == ticket.revision {
            self.has_unwritten_changes = false;
        }
        Ok(())
    }

    /// Abandon a failed write; the dirty flag is left as it was.
    pub fn fail_write(&mut self) -> Result<(), SyncError> {
        self.ensure_phase(SyncPhase::Writing)?;
        self.phase = SyncPhase::Idle;
        Ok(())
    }

    /// Start a read. Fails while any operation on this collection is in flight.
    pub fn begin_read(&mut self) -> Result<(), SyncError> {
        self.ensure_idle()?;
        self.phase = SyncPhase::Reading;
        Ok(())
    }

    /// Complete a successful read; the vehicle's items become the confirmed
    /// copy and local changes are considered discarded.
    pub fn finish_read(&mut self, items: Vec<MissionItem>) -> Result<(), SyncError> {
        self.ensure_phase(SyncPhase::Reading)?;
        self.phase = SyncPhase::Idle;
        self.confirmed = items;
        self.has_unwritten_changes = false;
        Ok(())
    }

    pub fn fail_read(&mut self) -> Result<(), SyncError> {
        self.ensure_phase(SyncPhase::Reading)?;
        self.phase = SyncPhase::Idle;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), SyncError> {
        match self.phase {
            SyncPhase::Idle => Ok(()),
            phase => Err(SyncError::Busy {
                mission_type: self.mission_type,
                phase,
            }),
        }
    }

    fn ensure_phase(&self, expected: SyncPhase) -> Result<(), SyncError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SyncError::NotInProgress(self.mission_type))
        }
    }
}
