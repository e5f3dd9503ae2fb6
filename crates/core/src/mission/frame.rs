//! Coordinate frames (MAV_FRAME subset)

/// Coordinate frame of a mission item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissionFrame {
    /// MAV_FRAME_GLOBAL, altitude above mean sea level
    Global,
    LocalNed,
    /// MAV_FRAME_MISSION, item is not located (DO commands)
    Mission,
    /// MAV_FRAME_GLOBAL_RELATIVE_ALT, altitude relative to home
    #[default]
    GlobalRelativeAlt,
    LocalEnu,
    GlobalInt,
    GlobalRelativeAltInt,
    /// MAV_FRAME_GLOBAL_TERRAIN_ALT, altitude above terrain
    GlobalTerrainAlt,
    GlobalTerrainAltInt,
    Other(u8),
}

impl MissionFrame {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Global,
            1 => Self::LocalNed,
            2 => Self::Mission,
            3 => Self::GlobalRelativeAlt,
            4 => Self::LocalEnu,
            5 => Self::GlobalInt,
            6 => Self::GlobalRelativeAltInt,
            10 => Self::GlobalTerrainAlt,
            11 => Self::GlobalTerrainAltInt,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Global => 0,
            Self::LocalNed => 1,
            Self::Mission => 2,
            Self::GlobalRelativeAlt => 3,
            Self::LocalEnu => 4,
            Self::GlobalInt => 5,
            Self::GlobalRelativeAltInt => 6,
            Self::GlobalTerrainAlt => 10,
            Self::GlobalTerrainAltInt => 11,
            Self::Other(code) => code,
        }
    }

    /// Absolute (AMSL) global frame, the frame of a home placeholder.
    pub fn is_global_absolute(self) -> bool {
        matches!(self, Self::Global | Self::GlobalInt)
    }
}
