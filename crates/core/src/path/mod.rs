//! Jump Graph Resolver
//!
//! Turns a mission's linear item order plus DO_JUMP commands into a drawable
//! path and a true flown distance.
//!
//! # Termination
//!
//! Distance resolution recurses only into the sub-slice between a jump's
//! target and the jump itself. A target is accepted only when it lies
//! strictly before the jump in the slice being resolved, so every recursive
//! call receives a strictly shorter slice than its caller.
//!
//! Loop distances are cached by `(target, jump)` range for the duration of
//! one top-level call. Without the cache, jumps whose loops contain earlier
//! jumps re-resolve the same ranges and the cost doubles per jump.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::mission::{MissionCommand, MissionItem};
use crate::navigation::{item_distance, GeoPoint};

/// Straight segment between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

impl PathSegment {
    fn between(from: &MissionItem, to: &MissionItem) -> Self {
        Self {
            from: GeoPoint::from(from),
            to: GeoPoint::from(to),
        }
    }

    pub fn length_m(&self) -> f64 {
        self.from.distance_to(&self.to)
    }
}

/// Drawable mission path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MissionPath {
    /// Flown legs plus one connector per resolved jump
    pub solid: Vec<PathSegment>,
    /// Implied loop back to the first item when the mission does not land
    pub dotted: Vec<PathSegment>,
}

/// Index of the jump target within `items[..jump_index]`.
fn jump_target_index(items: &[MissionItem], jump_index: usize) -> Option<usize> {
    let target = items[jump_index].jump_target()?;
    items[..jump_index].iter().position(|item| item.seq == target)
}

/// Build the drawable path.
///
/// `filtered` are the geometric nodes (see [`crate::mission::filter_items`]),
/// `raw` is the full collection, scanned for jump commands.
pub fn resolve_path(filtered: &[MissionItem], raw: &[MissionItem]) -> MissionPath {
    let mut path = MissionPath::default();

    for pair in filtered.windows(2) {
        path.solid.push(PathSegment::between(&pair[0], &pair[1]));
    }

    if let (Some(first), Some(last)) = (filtered.first(), filtered.last()) {
        if filtered.len() >= 2 && !last.command.is_landing() {
            path.dotted.push(PathSegment::between(last, first));
        }
    }

    for jump in raw.iter().filter(|item| item.command == MissionCommand::Jump) {
        let Some(target_seq) = jump.jump_target() else {
            continue;
        };
        if target_seq >= jump.seq {
            continue;
        }
        let target = filtered.iter().find(|item| item.seq == target_seq);
        let source = filtered.iter().rev().find(|item| item.seq < jump.seq);
        if let (Some(source), Some(target)) = (source, target) {
            if source.seq != target.seq {
                path.solid.push(PathSegment::between(source, target));
            }
        }
    }

    path
}

/// Total flown distance in meters, multiplying jump loops by their repeat
/// count.
///
/// Items without coordinates are skipped without breaking the chain.
/// Unresolved jumps contribute nothing.
pub fn resolve_total_distance(raw: &[MissionItem]) -> f64 {
    let mut loops = BTreeMap::new();
    resolve_range(raw, 0, raw.len(), &mut loops)
}

/// Distance flown over `raw[start..end]`.
fn resolve_range(
    raw: &[MissionItem],
    start: usize,
    end: usize,
    loops: &mut BTreeMap<(usize, usize), f64>,
) -> f64 {
    let mut total = 0.0;
    let mut last: Option<&MissionItem> = None;

    for index in start..end {
        let item = &raw[index];
        if item.command == MissionCommand::Jump {
            if let Some(offset) = jump_target_index(&raw[start..end], index - start) {
                let target = start + offset;
                let loop_distance = match loops.get(&(target, index)) {
                    Some(distance) => *distance,
                    None => {
                        let distance = resolve_range(raw, target, index, loops);
                        loops.insert((target, index), distance);
                        distance
                    }
                };
                total += loop_distance * item.jump_repeat();
            }
            continue;
        }
        if !item.has_coordinate() {
            continue;
        }
        if let Some(previous) = last {
            total += item_distance(previous, item);
        }
        last = Some(item);
    }

    total
}

/// Jump items whose target does not resolve to an earlier item.
pub fn unresolved_jumps(raw: &[MissionItem]) -> Vec<MissionItem> {
    raw.iter()
        .enumerate()
        .filter(|(_, item)| item.command == MissionCommand::Jump)
        .filter(|(index, _)| jump_target_index(raw, *index).is_none())
        .map(|(_, item)| *item)
        .collect()
}
