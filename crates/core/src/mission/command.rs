//! Mission Command Classification
//!
//! Closed set of MAVLink command kinds the planner reasons about. Every
//! other command code is carried through untouched as [`MissionCommand::Other`]
//! so that vehicle and file round-trips never lose information.
//!
//! Command IDs at or below `MAV_CMD_NAV_LAST` (95) are NAV commands and are
//! expected to carry a location.

use super::MissionType;

/// MAV_CMD_NAV_LAST: command IDs at or below this value are NAV commands.
pub const MAV_CMD_NAV_LAST: u16 = 95;

/// MAV_CMD_NAV_WAYPOINT
pub const MAV_CMD_NAV_WAYPOINT: u16 = 16;
/// MAV_CMD_NAV_RETURN_TO_LAUNCH
pub const MAV_CMD_NAV_RETURN_TO_LAUNCH: u16 = 20;
/// MAV_CMD_NAV_LAND
pub const MAV_CMD_NAV_LAND: u16 = 21;
/// MAV_CMD_NAV_TAKEOFF
pub const MAV_CMD_NAV_TAKEOFF: u16 = 22;
/// MAV_CMD_DO_JUMP
pub const MAV_CMD_DO_JUMP: u16 = 177;
/// MAV_CMD_NAV_FENCE_POLYGON_VERTEX_INCLUSION
pub const MAV_CMD_NAV_FENCE_POLYGON_VERTEX_INCLUSION: u16 = 5001;
/// MAV_CMD_NAV_FENCE_POLYGON_VERTEX_EXCLUSION
pub const MAV_CMD_NAV_FENCE_POLYGON_VERTEX_EXCLUSION: u16 = 5002;
/// MAV_CMD_NAV_FENCE_CIRCLE_INCLUSION
pub const MAV_CMD_NAV_FENCE_CIRCLE_INCLUSION: u16 = 5003;
/// MAV_CMD_NAV_FENCE_CIRCLE_EXCLUSION
pub const MAV_CMD_NAV_FENCE_CIRCLE_EXCLUSION: u16 = 5004;
/// MAV_CMD_NAV_RALLY_POINT
pub const MAV_CMD_NAV_RALLY_POINT: u16 = 5100;

/// Command kinds relevant to planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionCommand {
    Waypoint,
    Takeoff,
    Land,
    ReturnToLaunch,
    /// DO_JUMP: param1 = target seq, param2 = repeat count
    Jump,
    /// Polygon vertex, param1 = vertex count of the enclosing polygon
    FencePolygonInclusion,
    FencePolygonExclusion,
    /// Circle, param1 = radius in meters
    FenceCircleInclusion,
    FenceCircleExclusion,
    RallyPoint,
    /// Any command code the planner does not interpret
    Other(u16),
}

impl MissionCommand {
    /// Decode a raw MAVLink command ID.
    pub fn from_code(code: u16) -> Self {
        match code {
            MAV_CMD_NAV_WAYPOINT => Self::Waypoint,
            MAV_CMD_NAV_TAKEOFF => Self::Takeoff,
            MAV_CMD_NAV_LAND => Self::Land,
            MAV_CMD_NAV_RETURN_TO_LAUNCH => Self::ReturnToLaunch,
            MAV_CMD_DO_JUMP => Self::Jump,
            MAV_CMD_NAV_FENCE_POLYGON_VERTEX_INCLUSION => Self::FencePolygonInclusion,
            MAV_CMD_NAV_FENCE_POLYGON_VERTEX_EXCLUSION => Self::FencePolygonExclusion,
            MAV_CMD_NAV_FENCE_CIRCLE_INCLUSION => Self::FenceCircleInclusion,
            MAV_CMD_NAV_FENCE_CIRCLE_EXCLUSION => Self::FenceCircleExclusion,
            MAV_CMD_NAV_RALLY_POINT => Self::RallyPoint,
            other => Self::Other(other),
        }
    }

    /// Raw MAVLink command ID.
    pub fn code(self) -> u16 {
        match self {
            Self::Waypoint => MAV_CMD_NAV_WAYPOINT,
            Self::Takeoff => MAV_CMD_NAV_TAKEOFF,
            Self::Land => MAV_CMD_NAV_LAND,
            Self::ReturnToLaunch => MAV_CMD_NAV_RETURN_TO_LAUNCH,
            Self::Jump => MAV_CMD_DO_JUMP,
            Self::FencePolygonInclusion => MAV_CMD_NAV_FENCE_POLYGON_VERTEX_INCLUSION,
            Self::FencePolygonExclusion => MAV_CMD_NAV_FENCE_POLYGON_VERTEX_EXCLUSION,
            Self::FenceCircleInclusion => MAV_CMD_NAV_FENCE_CIRCLE_INCLUSION,
            Self::FenceCircleExclusion => MAV_CMD_NAV_FENCE_CIRCLE_EXCLUSION,
            Self::RallyPoint => MAV_CMD_NAV_RALLY_POINT,
            Self::Other(code) => code,
        }
    }

    /// Polygon vertex of either zone.
    pub fn is_fence_polygon(self) -> bool {
        matches!(self, Self::FencePolygonInclusion | Self::FencePolygonExclusion)
    }

    /// Circle of either zone.
    pub fn is_fence_circle(self) -> bool {
        matches!(self, Self::FenceCircleInclusion | Self::FenceCircleExclusion)
    }

    pub fn is_fence(self) -> bool {
        self.is_fence_polygon() || self.is_fence_circle()
    }

    /// Landing command terminating a mission path.
    pub fn is_landing(self) -> bool {
        matches!(self, Self::Land)
    }

    /// Whether this command may appear in a collection of the given type.
    pub fn allowed_in(self, mission_type: MissionType) -> bool {
        match mission_type {
            MissionType::Fence => self.is_fence(),
            MissionType::Rally => matches!(self, Self::RallyPoint),
            MissionType::Mission => !self.is_fence() && !matches!(self, Self::RallyPoint),
        }
    }
}

impl From<u16> for MissionCommand {
    fn from(code: u16) -> Self {
        Self::from_code(code)
    }
}

/// Classify a command as NAV (drives navigation) or DO (immediate action).
pub fn is_nav_command(command_id: u16) -> bool {
    command_id <= MAV_CMD_NAV_LAST
}

/// Check if a command carries a geographic location (lat/lon).
///
/// NAV commands do, except return-to-launch which flies to home. Fence and
/// rally commands are located as well.
pub fn cmd_has_location(command: MissionCommand) -> bool {
    match command {
        MissionCommand::ReturnToLaunch | MissionCommand::Jump => false,
        MissionCommand::Waypoint
        | MissionCommand::Takeoff
        | MissionCommand::Land
        | MissionCommand::FencePolygonInclusion
        | MissionCommand::FencePolygonExclusion
        | MissionCommand::FenceCircleInclusion
        | MissionCommand::FenceCircleExclusion
        | MissionCommand::RallyPoint => true,
        MissionCommand::Other(code) => is_nav_command(code),
    }
}
