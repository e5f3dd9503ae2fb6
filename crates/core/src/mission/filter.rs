//! Item filter
//!
//! Strips items that are not real geometric nodes before rendering or
//! statistics. The raw collection is never modified.

use alloc::vec::Vec;

use super::{MissionCommand, MissionItem};

/// True when `items[0]` is a home-position placeholder.
///
/// The placeholder is a waypoint in an absolute global frame at index 0.
pub fn is_home_placeholder(items: &[MissionItem]) -> bool {
    items.first().is_some_and(|first| {
        first.command == MissionCommand::Waypoint && first.frame.is_global_absolute()
    })
}

/// Return the geometric nodes of `items`.
///
/// Drops a leading home placeholder, then every item with `x == 0` or
/// `y == 0`. Order and `seq` are preserved.
pub fn filter_items(items: &[MissionItem]) -> Vec<MissionItem> {
    let skip = usize::from(is_home_placeholder(items));
    items[skip..]
        .iter()
        .filter(|item| item.has_coordinate())
        .copied()
        .collect()
}
