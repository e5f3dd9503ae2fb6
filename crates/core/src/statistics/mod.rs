//! Mission Statistics Engine
//!
//! Pure functions deriving safety statistics from a mission. Each result
//! carries the item(s) that produced the extremum so the UI can point at
//! them. Missing or zero coordinates count as absent; empty inputs give zero
//! values with no contributing items.

use crate::home::HomePosition;
use crate::mission::{filter_items, is_home_placeholder, MissionCommand, MissionItem};
use crate::navigation::{item_distance, GeoPoint};
use crate::path::resolve_total_distance;

/// Longest leg between consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxLeg {
    pub distance_m: f64,
    pub items: Option<(MissionItem, MissionItem)>,
}

/// Highest item altitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxAltitude {
    pub altitude_m: f32,
    pub item: Option<MissionItem>,
}

/// Steepest climb or descent between consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxGradient {
    /// |Δaltitude| / horizontal distance * 100
    pub percent: f64,
    pub items: Option<(MissionItem, MissionItem)>,
}

/// Farthest waypoint from home.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxHomeDistance {
    pub distance_m: f64,
    pub item: Option<MissionItem>,
}

/// All mission statistics, recomputed from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MissionStatistics {
    pub total_distance_m: f64,
    pub max_leg: MaxLeg,
    pub max_altitude: MaxAltitude,
    pub max_gradient: MaxGradient,
    pub max_home_distance: MaxHomeDistance,
}

impl MissionStatistics {
    /// Compute every statistic for a raw mission collection.
    pub fn compute(raw: &[MissionItem], home: Option<&HomePosition>) -> Self {
        let filtered = filter_items(raw);
        Self {
            total_distance_m: total_distance(raw),
            max_leg: max_leg_distance(&filtered),
            max_altitude: max_altitude(&filtered),
            max_gradient: max_slope_gradient(raw, home),
            max_home_distance: max_distance_from_home(&filtered, home),
        }
    }
}

fn round2(value: f64) -> f64 {
    libm::round(value * 100.0) / 100.0
}

/// Total path distance in meters, jump loops included, rounded to 2 dp.
pub fn total_distance(raw: &[MissionItem]) -> f64 {
    round2(resolve_total_distance(raw))
}

/// Longest distance between consecutive coordinate-bearing items.
pub fn max_leg_distance(filtered: &[MissionItem]) -> MaxLeg {
    let mut best = MaxLeg::default();
    let mut previous: Option<&MissionItem> = None;

    for item in filtered.iter().filter(|item| item.has_coordinate()) {
        if let Some(prev) = previous {
            let distance = item_distance(prev, item);
            if distance > best.distance_m {
                best = MaxLeg {
                    distance_m: distance,
                    items: Some((*prev, *item)),
                };
            }
        }
        previous = Some(item);
    }

    best
}

/// Highest `z` over the filtered items, never below zero.
pub fn max_altitude(filtered: &[MissionItem]) -> MaxAltitude {
    let mut best = MaxAltitude::default();
    for item in filtered {
        if item.z.is_finite() && item.z > best.altitude_m {
            best = MaxAltitude {
                altitude_m: item.z,
                item: Some(*item),
            };
        }
    }
    best
}

/// Steepest gradient between consecutive waypoints, in percent.
///
/// Works on the raw collection so that a takeoff item directly following
/// the home placeholder can be anchored at home: its coordinate becomes the
/// planned home (or the placeholder's own coordinate when no home is
/// planned). Without a located anchor the takeoff keeps its own
/// coordinate. Pairs with zero horizontal distance have no defined slope and
/// are skipped.
pub fn max_slope_gradient(raw: &[MissionItem], home: Option<&HomePosition>) -> MaxGradient {
    let has_placeholder = is_home_placeholder(raw);
    let start = usize::from(has_placeholder);
    let mut points = raw[start..].iter().copied().enumerate().filter_map(|(i, item)| {
        if i == 0 && has_placeholder && item.command == MissionCommand::Takeoff {
            let anchor = home
                .filter(|home| home.has_coordinate())
                .map(|home| (home.lat, home.lon))
                .or_else(|| raw[0].has_coordinate().then_some((raw[0].x, raw[0].y)));
            if let Some((x, y)) = anchor {
                return Some(MissionItem { x, y, ..item });
            }
        }
        item.has_coordinate().then_some(item)
    });

    let mut best = MaxGradient::default();
    let Some(mut previous) = points.by_ref().find(|item| item.z.is_finite()) else {
        return best;
    };

    for item in points.filter(|item| item.has_coordinate() && item.z.is_finite()) {
        let horizontal = item_distance(&previous, &item);
        if horizontal > 0.0 {
            let percent = libm::fabs((item.z - previous.z) as f64) / horizontal * 100.0;
            if percent > best.percent {
                best = MaxGradient {
                    percent,
                    items: Some((previous, item)),
                };
            }
        }
        previous = item;
    }

    best
}

/// Farthest great-circle distance from home to any located item.
pub fn max_distance_from_home(
    filtered: &[MissionItem],
    home: Option<&HomePosition>,
) -> MaxHomeDistance {
    let mut best = MaxHomeDistance::default();
    let Some(home) = home.filter(|home| home.has_coordinate()) else {
        return best;
    };
    let origin = home.point();

    for item in filtered.iter().filter(|item| item.has_coordinate()) {
        let distance = origin.distance_to(&GeoPoint::from(item));
        if distance > best.distance_m {
            best = MaxHomeDistance {
                distance_m: distance,
                item: Some(*item),
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::{ItemCollection, MissionFrame, MissionType};
    use alloc::vec;
    use alloc::vec::Vec;

    const DEG: i32 = 10_000_000;

    fn adopt(items: Vec<MissionItem>) -> Vec<MissionItem> {
        ItemCollection::from_items(MissionType::Mission, items)
            .items()
            .to_vec()
    }

    #[test]
    fn test_empty_mission() {
        let stats = MissionStatistics::compute(&[], None);
        assert_eq!(stats, MissionStatistics::default());
        assert!(stats.max_leg.items.is_none());
        assert!(stats.max_altitude.item.is_none());
    }

    #[test]
    fn test_total_distance_rounded_with_jump() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, 10.0),
            MissionItem::waypoint(DEG + 12_345, DEG, 10.0),
            MissionItem::jump(0, 3),
        ]);
        let d = item_distance(&raw[0], &raw[1]);
        let total = total_distance(&raw);
        assert!((total - 4.0 * d).abs() < 0.01);
        assert_eq!(total, libm::round(total * 100.0) / 100.0);
    }

    #[test]
    fn test_max_leg_attributes_pair() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, 10.0),
            MissionItem::waypoint(2 * DEG, DEG, 10.0),
            MissionItem::waypoint(2 * DEG + 10_000, DEG, 10.0),
        ]);
        let leg = max_leg_distance(&filter_items(&raw));
        assert!((leg.distance_m - 111_320.0).abs() < 5.0, "got {}", leg.distance_m);
        let (a, b) = leg.items.unwrap();
        assert_eq!((a.seq, b.seq), (0, 1));
    }

    #[test]
    fn test_max_altitude_floor_zero() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, -20.0),
            MissionItem::waypoint(DEG + 1, DEG, -5.0),
        ]);
        let alt = max_altitude(&filter_items(&raw));
        assert_eq!(alt.altitude_m, 0.0);
        assert!(alt.item.is_none());
    }

    #[test]
    fn test_max_altitude_excludes_home_placeholder() {
        let home = MissionItem::waypoint(DEG, DEG, 900.0).with_frame(MissionFrame::Global);
        let raw = adopt(vec![
            home,
            MissionItem::waypoint(DEG + 100, DEG, 120.0),
            MissionItem::waypoint(DEG + 200, DEG, 80.0),
        ]);
        let alt = max_altitude(&filter_items(&raw));
        assert_eq!(alt.altitude_m, 120.0);
        assert_eq!(alt.item.unwrap().seq, 1);
    }

    #[test]
    fn test_slope_ten_percent() {
        // 8983 * 1e-7 deg of latitude is ~100 m
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, 20.0),
            MissionItem::waypoint(DEG + 8_983, DEG, 30.0),
        ]);
        let gradient = max_slope_gradient(&raw, None);
        assert!((gradient.percent - 10.0).abs() < 0.01, "got {}", gradient.percent);
        let (a, b) = gradient.items.unwrap();
        assert_eq!((a.seq, b.seq), (0, 1));
    }

    #[test]
    fn test_slope_skips_zero_horizontal_distance() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, 10.0),
            MissionItem::waypoint(DEG, DEG, 60.0),
        ]);
        let gradient = max_slope_gradient(&raw, None);
        assert_eq!(gradient.percent, 0.0);
        assert!(gradient.items.is_none());
    }

    #[test]
    fn test_takeoff_anchored_at_home() {
        let placeholder = MissionItem::waypoint(DEG, DEG, 0.0).with_frame(MissionFrame::Global);
        let takeoff = MissionItem::new(MissionCommand::Takeoff, 0, 0, 0.0);
        let raw = adopt(vec![
            placeholder,
            takeoff,
            MissionItem::waypoint(DEG + 8_983, DEG, 10.0),
        ]);
        let home = HomePosition::new(DEG, DEG, 0.0);
        let gradient = max_slope_gradient(&raw, Some(&home));
        assert!((gradient.percent - 10.0).abs() < 0.01, "got {}", gradient.percent);
        let (a, _) = gradient.items.unwrap();
        assert_eq!(a.command, MissionCommand::Takeoff);
        assert_eq!((a.x, a.y), (DEG, DEG));
    }

    #[test]
    fn test_takeoff_keeps_own_coordinate_without_located_anchor() {
        let placeholder = MissionItem::waypoint(0, 0, 0.0).with_frame(MissionFrame::Global);
        let takeoff = MissionItem::new(MissionCommand::Takeoff, DEG, DEG, 0.0);
        let raw = adopt(vec![
            placeholder,
            takeoff,
            MissionItem::waypoint(DEG + 8_983, DEG, 10.0),
        ]);
        let gradient = max_slope_gradient(&raw, None);
        assert!((gradient.percent - 10.0).abs() < 0.01, "got {}", gradient.percent);
        let (a, _) = gradient.items.unwrap();
        assert_eq!((a.x, a.y), (DEG, DEG));
    }

    #[test]
    fn test_takeoff_without_placeholder_not_anchored() {
        let takeoff = MissionItem::new(MissionCommand::Takeoff, 0, 0, 0.0);
        let raw = adopt(vec![
            takeoff,
            MissionItem::waypoint(DEG, DEG, 10.0),
            MissionItem::waypoint(DEG + 8_983, DEG, 15.0),
        ]);
        let home = HomePosition::new(DEG - 8_983, DEG, 0.0);
        let gradient = max_slope_gradient(&raw, Some(&home));
        assert!((gradient.percent - 5.0).abs() < 0.01, "got {}", gradient.percent);
    }

    #[test]
    fn test_home_distance() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG + 10_000, DEG, 10.0),
            MissionItem::waypoint(DEG + 50_000, DEG, 10.0),
            MissionItem::waypoint(DEG + 20_000, DEG, 10.0),
        ]);
        let home = HomePosition::new(DEG, DEG, 0.0);
        let result = max_distance_from_home(&filter_items(&raw), Some(&home));
        assert_eq!(result.item.unwrap().seq, 1);
        assert!((result.distance_m - 556.6).abs() < 1.0, "got {}", result.distance_m);
    }

    #[test]
    fn test_home_distance_without_home() {
        let raw = adopt(vec![MissionItem::waypoint(DEG, DEG, 10.0)]);
        let result = max_distance_from_home(&raw, None);
        assert_eq!(result.distance_m, 0.0);
        assert!(result.item.is_none());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let raw = adopt(vec![
            MissionItem::waypoint(DEG, DEG, 10.0),
            MissionItem::waypoint(DEG + 5_000, DEG + 5_000, 40.0),
            MissionItem::jump(0, 2),
        ]);
        let home = HomePosition::new(DEG, DEG, 0.0);
        assert_eq!(
            MissionStatistics::compute(&raw, Some(&home)),
            MissionStatistics::compute(&raw, Some(&home))
        );
    }
}
