//! MAVLink 2.0 Vehicle Link
//!
//! Implements [`VehicleLink`] on top of a message transport.
//!
//! # Architecture
//!
//! - **Transport**: whole-message send/receive ([`transport::MavTransport`])
//! - **Transfer**: sans-IO mission protocol state machine ([`transfer::MissionTransfer`])
//! - **Wire**: item and enum conversions ([`wire`])
//! - **Link**: drives transfers and commands with timeouts and retries
//!
//! Only one exchange runs on a link at a time; concurrent requests queue on
//! the link lock so replies are never consumed by the wrong exchange.

pub mod transfer;
pub mod transport;
pub mod wire;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use mavlink::common::{
    MavCmd, MavMessage, MavResult, COMMAND_LONG_DATA, MISSION_SET_CURRENT_DATA,
};
use mavlink::MavHeader;
use tokio::sync::Mutex;
use trail_planner_core::home::HomePosition;
use trail_planner_core::mission::{MissionItem, MissionType};

use crate::communication::link::{MissionControl, ProgressReporter, VehicleLink};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use transfer::{MissionTransfer, TransferStep};
pub use transport::{MavTransport, UdpTransport};

/// Link settings taken from [`PlannerConfig`].
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings {
    pub target_system: u8,
    pub target_component: u8,
    pub timeout: Duration,
    pub max_retries: u8,
}

impl From<&PlannerConfig> for LinkSettings {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            target_system: config.target_system_id,
            target_component: config.target_component_id,
            timeout: config.transfer_timeout(),
            max_retries: config.max_retries,
        }
    }
}

/// MAVLink client for one vehicle.
pub struct MavlinkLink<T> {
    transport: T,
    settings: LinkSettings,
    exchange: Mutex<()>,
}

impl<T: MavTransport> MavlinkLink<T> {
    pub fn new(transport: T, settings: LinkSettings) -> Self {
        Self {
            transport,
            settings,
            exchange: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn new_transfer(&self) -> MissionTransfer {
        MissionTransfer::new(
            self.settings.target_system,
            self.settings.target_component,
            self.settings.timeout.as_micros() as u64,
            self.settings.max_retries,
        )
    }

    fn from_vehicle(&self, header: &MavHeader) -> bool {
        header.system_id == self.settings.target_system
    }

    /// Run one mission transfer to completion.
    async fn run_transfer(
        &self,
        transfer: &mut MissionTransfer,
        mission_type: MissionType,
        first: MavMessage,
        started: Instant,
        progress: &ProgressReporter,
    ) -> Result<Vec<MissionItem>> {
        let now_us = || started.elapsed().as_micros() as u64;

        self.transport.send(&first).await?;
        loop {
            match tokio::time::timeout(self.settings.timeout, self.transport.recv()).await {
                Ok(Ok((header, msg))) if self.from_vehicle(&header) => {
                    match transfer.handle_message(&msg, now_us())? {
                        TransferStep::Ignored => {}
                        TransferStep::Reply(reply) => {
                            self.transport.send(&reply).await?;
                            if let Some((done, total)) = transfer.progress() {
                                progress.report(mission_type, done, total);
                            }
                        }
                        TransferStep::Complete { reply, items } => {
                            if let Some(reply) = reply {
                                self.transport.send(&reply).await?;
                            }
                            let total = items.len() as u16;
                            progress.report(mission_type, total, total);
                            return Ok(items);
                        }
                    }
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    transfer.abort();
                    return Err(e);
                }
                Err(_elapsed) => {}
            }

            if let Some(resend) = transfer.check_timeout(now_us())? {
                warn!("{} transfer stalled, resending", mission_type);
                self.transport.send(&resend).await?;
            }
        }
    }

    /// Send `request` until `accept` produces a result or retries run out.
    ///
    /// `accept` returns `None` for messages that do not answer the request.
    async fn request<R, F>(&self, request: MavMessage, waiting_for: &'static str, mut accept: F) -> Result<R>
    where
        F: FnMut(&MavMessage) -> Option<Result<R>> + Send,
        R: Send,
    {
        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                debug!("Retrying request for {} ({}/{})", waiting_for, attempt, self.settings.max_retries);
            }
            self.transport.send(&request).await?;

            let deadline = tokio::time::Instant::now() + self.settings.timeout;
            loop {
                match tokio::time::timeout_at(deadline, self.transport.recv()).await {
                    Ok(Ok((header, msg))) if self.from_vehicle(&header) => {
                        if let Some(result) = accept(&msg) {
                            return result;
                        }
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(_elapsed) => break,
                }
            }
        }
        warn!("No {} after {} retries", waiting_for, self.settings.max_retries);
        Err(PlannerError::Timeout(waiting_for))
    }

    fn command_long(&self, command: MavCmd, param1: f32) -> MavMessage {
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            target_system: self.settings.target_system,
            target_component: self.settings.target_component,
            command,
            confirmation: 0,
            param1,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            param5: 0.0,
            param6: 0.0,
            param7: 0.0,
        })
    }

    /// Send a command and wait for its COMMAND_ACK.
    async fn command(&self, command: MavCmd, operation: &'static str) -> Result<()> {
        let request = self.command_long(command, 0.0);
        self.request(request, "COMMAND_ACK", |msg| match msg {
            MavMessage::COMMAND_ACK(ack) if ack.command == command => {
                Some(command_result(ack.result, operation))
            }
            _ => None,
        })
        .await
    }
}

fn command_result(result: MavResult, operation: &'static str) -> Result<()> {
    match result {
        MavResult::MAV_RESULT_ACCEPTED | MavResult::MAV_RESULT_IN_PROGRESS => Ok(()),
        other => Err(PlannerError::VehicleRejected {
            operation,
            reason: format!("{:?}", other),
        }),
    }
}

#[async_trait]
impl<T: MavTransport> VehicleLink for MavlinkLink<T> {
    async fn get_current_mission(
        &self,
        mission_type: MissionType,
        progress: &ProgressReporter,
    ) -> Result<Vec<MissionItem>> {
        let _guard = self.exchange.lock().await;
        let mut transfer = self.new_transfer();
        let started = Instant::now();
        let first = transfer.start_download(mission_type, 0)?;
        self.run_transfer(&mut transfer, mission_type, first, started, progress)
            .await
    }

    async fn write_current_mission(
        &self,
        mission_type: MissionType,
        items: &[MissionItem],
        progress: &ProgressReporter,
    ) -> Result<()> {
        let _guard = self.exchange.lock().await;
        let mut transfer = self.new_transfer();
        let started = Instant::now();
        let first = transfer.start_upload(mission_type, items, 0)?;
        self.run_transfer(&mut transfer, mission_type, first, started, progress)
            .await?;
        Ok(())
    }

    async fn get_home_position(&self) -> Result<HomePosition> {
        let _guard = self.exchange.lock().await;
        let request = self.command_long(MavCmd::MAV_CMD_GET_HOME_POSITION, 0.0);
        let home = self
            .request(request, "HOME_POSITION", |msg| match msg {
                MavMessage::HOME_POSITION(data) => Some(Ok(HomePosition::new(
                    data.latitude,
                    data.longitude,
                    data.altitude as f32 / 1000.0,
                ))),
                MavMessage::COMMAND_ACK(ack) if ack.command == MavCmd::MAV_CMD_GET_HOME_POSITION => {
                    match command_result(ack.result, "home position request") {
                        Ok(()) => None,
                        Err(e) => Some(Err(e)),
                    }
                }
                _ => None,
            })
            .await?;
        info!(
            "Vehicle home: {:.7}, {:.7}, {:.2} m",
            home.latitude(),
            home.longitude(),
            home.alt
        );
        Ok(home)
    }

    async fn control_mission(&self, control: MissionControl) -> Result<()> {
        let _guard = self.exchange.lock().await;
        if control == MissionControl::Restart {
            let request = MavMessage::MISSION_SET_CURRENT(MISSION_SET_CURRENT_DATA {
                target_system: self.settings.target_system,
                target_component: self.settings.target_component,
                seq: 0,
            });
            self.request(request, "MISSION_CURRENT", |msg| match msg {
                MavMessage::MISSION_CURRENT(current) if current.seq == 0 => Some(Ok(())),
                _ => None,
            })
            .await?;
        }
        self.command(MavCmd::MAV_CMD_MISSION_START, "mission start")
            .await?;
        info!("Mission {:?} accepted", control);
        Ok(())
    }
}
