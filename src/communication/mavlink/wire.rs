//! Conversions between planner items and MAVLink message payloads.

use mavlink::common::{MavCmd, MavFrame, MavMissionType, MISSION_ITEM_INT_DATA};
use num_traits::FromPrimitive;
use trail_planner_core::mission::{MissionCommand, MissionFrame, MissionItem, MissionType};

use crate::error::{PlannerError, Result};

pub fn mav_mission_type(mission_type: MissionType) -> MavMissionType {
    match mission_type {
        MissionType::Mission => MavMissionType::MAV_MISSION_TYPE_MISSION,
        MissionType::Fence => MavMissionType::MAV_MISSION_TYPE_FENCE,
        MissionType::Rally => MavMissionType::MAV_MISSION_TYPE_RALLY,
    }
}

/// Planner collection for a wire mission type, `None` for `ALL` and unknowns.
pub fn mission_type_from_mav(mission_type: MavMissionType) -> Option<MissionType> {
    match mission_type {
        MavMissionType::MAV_MISSION_TYPE_MISSION => Some(MissionType::Mission),
        MavMissionType::MAV_MISSION_TYPE_FENCE => Some(MissionType::Fence),
        MavMissionType::MAV_MISSION_TYPE_RALLY => Some(MissionType::Rally),
        _ => None,
    }
}

/// Convert an item to MISSION_ITEM_INT_DATA.
///
/// Fails for command or frame codes the MAVLink dialect cannot encode.
pub fn item_to_mission_item(
    item: &MissionItem,
    mission_type: MissionType,
    target_system: u8,
    target_component: u8,
) -> Result<MISSION_ITEM_INT_DATA> {
    let command = MavCmd::from_u16(item.command.code()).ok_or_else(|| {
        PlannerError::Protocol(format!(
            "command {} of item {} has no MAVLink encoding",
            item.command.code(),
            item.seq
        ))
    })?;
    let frame = MavFrame::from_u8(item.frame.code()).ok_or_else(|| {
        PlannerError::Protocol(format!(
            "frame {} of item {} has no MAVLink encoding",
            item.frame.code(),
            item.seq
        ))
    })?;

    Ok(MISSION_ITEM_INT_DATA {
        target_system,
        target_component,
        seq: item.seq,
        frame,
        command,
        current: u8::from(item.seq == 0 && mission_type == MissionType::Mission),
        autocontinue: 1,
        param1: item.param1,
        param2: item.param2,
        param3: item.param3,
        param4: item.param4,
        x: item.x,
        y: item.y,
        z: item.z,
        mission_type: mav_mission_type(mission_type),
    })
}

/// Convert MISSION_ITEM_INT_DATA to an unassigned item.
pub fn mission_item_to_item(data: &MISSION_ITEM_INT_DATA) -> MissionItem {
    MissionItem::new(
        MissionCommand::from_code(data.command as u16),
        data.x,
        data.y,
        data.z,
    )
    .with_frame(MissionFrame::from_code(data.frame as u8))
    .with_params(data.param1, data.param2, data.param3, data.param4)
    .with_seq(data.seq)
}
