//! Mission Transfer State Machine
//!
//! Client side of the MAVLink mission micro-protocol. The state machine
//! performs no I/O: callers feed it received messages and the current time
//! and send whatever it returns.
//!
//! # Upload Flow (planner → vehicle)
//!
//! 1. Planner sends MISSION_COUNT with the number of items
//! 2. Vehicle sends MISSION_REQUEST_INT for seq=0
//! 3. Planner replies with MISSION_ITEM_INT for seq=0
//! 4. ... repeat until the vehicle has every item
//! 5. Vehicle sends MISSION_ACK with the result
//!
//! # Download Flow (vehicle → planner)
//!
//! 1. Planner sends MISSION_REQUEST_LIST
//! 2. Vehicle responds with MISSION_COUNT
//! 3. Planner sends MISSION_REQUEST_INT for seq=0
//! 4. Vehicle responds with MISSION_ITEM_INT for seq=0
//! 5. ... repeat until all items received
//! 6. Planner sends MISSION_ACK
//!
//! # Timeout Handling
//!
//! - The last message sent is repeated when nothing relevant arrives within
//!   the timeout
//! - After `max_retries` repeats the transfer aborts and returns to Idle
//! - Partial downloads are discarded on abort

use log::{debug, info, warn};
use mavlink::common::{
    MavMessage, MavMissionResult, MISSION_ACK_DATA, MISSION_COUNT_DATA, MISSION_ITEM_INT_DATA,
    MISSION_REQUEST_INT_DATA, MISSION_REQUEST_LIST_DATA,
};
use trail_planner_core::mission::{MissionItem, MissionType};

use super::wire::{item_to_mission_item, mav_mission_type, mission_item_to_item, mission_type_from_mav};
use crate::error::{PlannerError, Result};

/// Mission transfer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    /// No transfer in progress
    #[default]
    Idle,
    /// Upload in progress (planner → vehicle)
    UploadInProgress {
        mission_type: MissionType,
        /// Total item count
        count: u16,
        /// Highest item sent so far, plus one
        sent: u16,
        /// Last activity timestamp (microseconds)
        last_activity_us: u64,
        /// Repeats of the last message since the last activity
        retries: u8,
    },
    /// Download in progress (vehicle → planner)
    DownloadInProgress {
        mission_type: MissionType,
        /// Item count, once MISSION_COUNT arrived
        count: Option<u16>,
        /// Last activity timestamp (microseconds)
        last_activity_us: u64,
        retries: u8,
    },
}

/// Result of feeding one message to the transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferStep {
    /// Message does not belong to this transfer
    Ignored,
    /// Send this reply and keep waiting
    Reply(MavMessage),
    /// Transfer finished; send `reply` if present
    Complete {
        reply: Option<MavMessage>,
        items: Vec<MissionItem>,
    },
}

/// Client-side mission transfer
pub struct MissionTransfer {
    target_system: u8,
    target_component: u8,
    timeout_us: u64,
    max_retries: u8,
    state: TransferState,
    /// Items being uploaded, or received so far
    items: Vec<MissionItem>,
    /// Encoded upload items, indexed by seq
    outgoing: Vec<MISSION_ITEM_INT_DATA>,
    last_sent: Option<MavMessage>,
}

impl MissionTransfer {
    /// Create a new transfer client
    ///
    /// # Arguments
    ///
    /// * `target_system` - Vehicle MAVLink system ID
    /// * `target_component` - Vehicle MAVLink component ID
    /// * `timeout_us` - Silence tolerated before repeating the last message
    /// * `max_retries` - Repeats before the transfer fails
    pub fn new(target_system: u8, target_component: u8, timeout_us: u64, max_retries: u8) -> Self {
        Self {
            target_system,
            target_component,
            timeout_us,
            max_retries,
            state: TransferState::Idle,
            items: Vec::new(),
            outgoing: Vec::new(),
            last_sent: None,
        }
    }

    /// Get current transfer state
    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransferState::Idle
    }

    /// `(done, total)` of the running transfer.
    pub fn progress(&self) -> Option<(u16, u16)> {
        match self.state {
            TransferState::UploadInProgress { count, sent, .. } => Some((sent, count)),
            TransferState::DownloadInProgress {
                count: Some(count), ..
            } => Some((self.items.len() as u16, count)),
            _ => None,
        }
    }

    /// Begin an upload, returning the MISSION_COUNT to send.
    pub fn start_upload(
        &mut self,
        mission_type: MissionType,
        items: &[MissionItem],
        current_time_us: u64,
    ) -> Result<MavMessage> {
        self.ensure_idle(mission_type)?;
        if items.len() > u16::MAX as usize {
            return Err(PlannerError::Protocol(format!(
                "{} items exceed the protocol limit",
                items.len()
            )));
        }

        let items: Vec<MissionItem> = items
            .iter()
            .enumerate()
            .map(|(index, item)| item.with_seq(index as u16))
            .collect();
        let outgoing = items
            .iter()
            .map(|item| {
                item_to_mission_item(item, mission_type, self.target_system, self.target_component)
            })
            .collect::<Result<Vec<_>>>()?;

        let count = items.len() as u16;
        info!("{} upload started: {} items", mission_type, count);
        self.items = items;
        self.outgoing = outgoing;
        self.state = TransferState::UploadInProgress {
            mission_type,
            count,
            sent: 0,
            last_activity_us: current_time_us,
            retries: 0,
        };

        let msg = MavMessage::MISSION_COUNT(MISSION_COUNT_DATA {
            target_system: self.target_system,
            target_component: self.target_component,
            count,
            mission_type: mav_mission_type(mission_type),
            opaque_id: 0,
        });
        Ok(self.remember(msg))
    }

    /// Begin a download, returning the MISSION_REQUEST_LIST to send.
    pub fn start_download(
        &mut self,
        mission_type: MissionType,
        current_time_us: u64,
    ) -> Result<MavMessage> {
        self.ensure_idle(mission_type)?;
        info!("{} download started", mission_type);
        self.items.clear();
        self.outgoing.clear();
        self.state = TransferState::DownloadInProgress {
            mission_type,
            count: None,
            last_activity_us: current_time_us,
            retries: 0,
        };

        let msg = MavMessage::MISSION_REQUEST_LIST(MISSION_REQUEST_LIST_DATA {
            target_system: self.target_system,
            target_component: self.target_component,
            mission_type: mav_mission_type(mission_type),
        });
        Ok(self.remember(msg))
    }

    /// Feed a received message.
    pub fn handle_message(&mut self, msg: &MavMessage, current_time_us: u64) -> Result<TransferStep> {
        match self.state {
            TransferState::Idle => Ok(TransferStep::Ignored),
            TransferState::UploadInProgress { mission_type, .. } => match msg {
                MavMessage::MISSION_REQUEST_INT(data)
                    if mission_type_from_mav(data.mission_type) == Some(mission_type) =>
                {
                    self.handle_item_request(data.seq, current_time_us)
                }
                MavMessage::MISSION_ACK(data)
                    if mission_type_from_mav(data.mission_type) == Some(mission_type) =>
                {
                    self.handle_upload_ack(data)
                }
                _ => Ok(TransferStep::Ignored),
            },
            TransferState::DownloadInProgress { mission_type, .. } => match msg {
                MavMessage::MISSION_COUNT(data)
                    if mission_type_from_mav(data.mission_type) == Some(mission_type) =>
                {
                    Ok(self.handle_count(data, current_time_us))
                }
                MavMessage::MISSION_ITEM_INT(data)
                    if mission_type_from_mav(data.mission_type) == Some(mission_type) =>
                {
                    Ok(self.handle_item_int(data, current_time_us))
                }
                MavMessage::MISSION_ACK(data)
                    if mission_type_from_mav(data.mission_type) == Some(mission_type) =>
                {
                    self.abort();
                    Err(PlannerError::VehicleRejected {
                        operation: "mission download",
                        reason: format!("{:?}", data.mavtype),
                    })
                }
                _ => Ok(TransferStep::Ignored),
            },
        }
    }

    /// Check for timeout, returning a message to repeat.
    ///
    /// Fails with [`PlannerError::Timeout`] once retries are exhausted; the
    /// transfer is then back in Idle.
    pub fn check_timeout(&mut self, current_time_us: u64) -> Result<Option<MavMessage>> {
        let (last_activity_us, retries, waiting_for) = match self.state {
            TransferState::Idle => return Ok(None),
            TransferState::UploadInProgress {
                last_activity_us,
                retries,
                sent,
                count,
                ..
            } => (
                last_activity_us,
                retries,
                if sent < count {
                    "MISSION_REQUEST_INT"
                } else {
                    "MISSION_ACK"
                },
            ),
            TransferState::DownloadInProgress {
                last_activity_us,
                retries,
                count,
                ..
            } => (
                last_activity_us,
                retries,
                if count.is_some() {
                    "MISSION_ITEM_INT"
                } else {
                    "MISSION_COUNT"
                },
            ),
        };

        if current_time_us.saturating_sub(last_activity_us) <= self.timeout_us {
            return Ok(None);
        }
        if retries >= self.max_retries {
            warn!("Mission transfer timeout waiting for {}, aborting", waiting_for);
            self.abort();
            return Err(PlannerError::Timeout(waiting_for));
        }

        debug!(
            "No {} after {} us, retry {}/{}",
            waiting_for,
            self.timeout_us,
            retries + 1,
            self.max_retries
        );
        self.touch(current_time_us, retries + 1);
        Ok(self.last_sent.clone())
    }

    /// Abort the current transfer
    pub fn abort(&mut self) {
        if let TransferState::DownloadInProgress { .. } = self.state {
            // Discard partial download
            self.items.clear();
        }
        self.outgoing.clear();
        self.last_sent = None;
        self.state = TransferState::Idle;
    }

    fn handle_item_request(&mut self, seq: u16, current_time_us: u64) -> Result<TransferStep> {
        let TransferState::UploadInProgress {
            mission_type,
            count,
            sent,
            ..
        } = self.state
        else {
            return Ok(TransferStep::Ignored);
        };

        let Some(item) = self.outgoing.get(seq as usize) else {
            warn!("Vehicle requested {} item {} of {}", mission_type, seq, count);
            self.abort();
            return Err(PlannerError::Protocol(format!(
                "vehicle requested item {} of {}",
                seq, count
            )));
        };

        debug!("Sending {} item {}", mission_type, seq);
        let msg = MavMessage::MISSION_ITEM_INT(item.clone());
        self.state = TransferState::UploadInProgress {
            mission_type,
            count,
            sent: sent.max(seq + 1),
            last_activity_us: current_time_us,
            retries: 0,
        };
        Ok(TransferStep::Reply(self.remember(msg)))
    }

    fn handle_upload_ack(&mut self, data: &MISSION_ACK_DATA) -> Result<TransferStep> {
        if data.mavtype != MavMissionResult::MAV_MISSION_ACCEPTED {
            warn!("Upload rejected: {:?}", data.mavtype);
            self.abort();
            return Err(PlannerError::VehicleRejected {
                operation: "mission upload",
                reason: format!("{:?}", data.mavtype),
            });
        }
        info!("Upload complete: {} items", self.items.len());
        let items = std::mem::take(&mut self.items);
        self.abort();
        Ok(TransferStep::Complete { reply: None, items })
    }

    fn handle_count(&mut self, data: &MISSION_COUNT_DATA, current_time_us: u64) -> TransferStep {
        let TransferState::DownloadInProgress { mission_type, .. } = self.state else {
            return TransferStep::Ignored;
        };

        if data.count == 0 {
            info!("{} download complete: empty", mission_type);
            let ack = self.create_ack(mission_type, MavMissionResult::MAV_MISSION_ACCEPTED);
            self.abort();
            return TransferStep::Complete {
                reply: Some(ack),
                items: Vec::new(),
            };
        }

        // A repeated count (after a retried request list) restarts nothing
        self.state = TransferState::DownloadInProgress {
            mission_type,
            count: Some(data.count),
            last_activity_us: current_time_us,
            retries: 0,
        };
        let next_seq = self.items.len() as u16;
        TransferStep::Reply(self.remember(self.create_request(mission_type, next_seq)))
    }

    fn handle_item_int(&mut self, data: &MISSION_ITEM_INT_DATA, current_time_us: u64) -> TransferStep {
        let TransferState::DownloadInProgress {
            mission_type,
            count: Some(count),
            ..
        } = self.state
        else {
            return TransferStep::Ignored;
        };

        let next_seq = self.items.len() as u16;
        if data.seq != next_seq {
            debug!("Ignoring item {} while waiting for {}", data.seq, next_seq);
            return TransferStep::Ignored;
        }

        self.items.push(mission_item_to_item(data));
        debug!("Received {} item {}/{}", mission_type, next_seq + 1, count);
        self.touch(current_time_us, 0);

        if next_seq + 1 >= count {
            info!("{} download complete: {} items", mission_type, count);
            let ack = self.create_ack(mission_type, MavMissionResult::MAV_MISSION_ACCEPTED);
            let items = std::mem::take(&mut self.items);
            self.abort();
            TransferStep::Complete {
                reply: Some(ack),
                items,
            }
        } else {
            TransferStep::Reply(self.remember(self.create_request(mission_type, next_seq + 1)))
        }
    }

    fn ensure_idle(&self, mission_type: MissionType) -> Result<()> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(PlannerError::TransferInProgress(mission_type))
        }
    }

    fn touch(&mut self, current_time_us: u64, new_retries: u8) {
        match &mut self.state {
            TransferState::UploadInProgress {
                last_activity_us,
                retries,
                ..
            }
            | TransferState::DownloadInProgress {
                last_activity_us,
                retries,
                ..
            } => {
                *last_activity_us = current_time_us;
                *retries = new_retries;
            }
            TransferState::Idle => {}
        }
    }

    fn remember(&mut self, msg: MavMessage) -> MavMessage {
        self.last_sent = Some(msg.clone());
        msg
    }

    fn create_request(&self, mission_type: MissionType, seq: u16) -> MavMessage {
        MavMessage::MISSION_REQUEST_INT(MISSION_REQUEST_INT_DATA {
            target_system: self.target_system,
            target_component: self.target_component,
            seq,
            mission_type: mav_mission_type(mission_type),
        })
    }

    /// Create MISSION_ACK message
    fn create_ack(&self, mission_type: MissionType, result: MavMissionResult) -> MavMessage {
        MavMessage::MISSION_ACK(MISSION_ACK_DATA {
            target_system: self.target_system,
            target_component: self.target_component,
            mavtype: result,
            mission_type: mav_mission_type(mission_type),
            opaque_id: 0,
        })
    }
}
