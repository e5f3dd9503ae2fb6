//! Fence Classifier
//!
//! Groups fence collection items into polygons and circles.
//!
//! # Polygon Streams
//!
//! Polygon vertices arrive as consecutive items. `param1` of a vertex holds
//! the vertex count of the polygon it belongs to; once a run of vertices
//! reaches that count, the run is closed as one polygon. A stream that ends
//! before the declared count is reached produces a trailing polygon marked
//! incomplete, which callers may draw open or drop.

use alloc::vec::Vec;

use crate::mission::{MissionCommand, MissionItem};

/// Whether a fence shape keeps the vehicle inside or outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceZone {
    Inclusion,
    Exclusion,
}

impl FenceZone {
    /// Zone of a fence command, `None` for non-fence commands.
    pub fn of(command: MissionCommand) -> Option<Self> {
        match command {
            MissionCommand::FencePolygonInclusion | MissionCommand::FenceCircleInclusion => {
                Some(FenceZone::Inclusion)
            }
            MissionCommand::FencePolygonExclusion | MissionCommand::FenceCircleExclusion => {
                Some(FenceZone::Exclusion)
            }
            _ => None,
        }
    }
}

/// Polygon built from consecutive vertex items.
#[derive(Debug, Clone, PartialEq)]
pub struct FencePolygon {
    pub zone: FenceZone,
    pub vertices: Vec<MissionItem>,
    /// False when the stream ended (or changed zone) before the declared
    /// vertex count was reached
    pub complete: bool,
}

impl FencePolygon {
    /// Vertex count declared by the polygon's items.
    pub fn declared_vertices(&self) -> usize {
        self.vertices
            .iter()
            .map(|vertex| declared_count(vertex))
            .max()
            .unwrap_or(0)
    }
}

/// One circle item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FenceCircle {
    pub zone: FenceZone,
    pub item: MissionItem,
}

impl FenceCircle {
    /// Radius in meters (param1).
    pub fn radius_m(&self) -> f32 {
        self.item.param1
    }
}

/// Classified fence shapes, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FenceShapes {
    pub polygons: Vec<FencePolygon>,
    pub circles: Vec<FenceCircle>,
}

impl FenceShapes {
    /// Polygons whose vertex count was reached.
    pub fn complete_polygons(&self) -> impl Iterator<Item = &FencePolygon> {
        self.polygons.iter().filter(|polygon| polygon.complete)
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.circles.is_empty()
    }
}

fn declared_count(item: &MissionItem) -> usize {
    if item.param1 >= 1.0 {
        item.param1 as usize
    } else {
        0
    }
}

/// Partition fence items into polygons and circles.
///
/// Items that are neither polygon vertices nor circles are ignored.
pub fn classify_fence(items: &[MissionItem]) -> FenceShapes {
    let mut shapes = FenceShapes::default();
    let mut run: Vec<MissionItem> = Vec::new();
    let mut run_zone: Option<FenceZone> = None;

    for item in items {
        if item.command.is_fence_circle() {
            if let Some(zone) = FenceZone::of(item.command) {
                shapes.circles.push(FenceCircle { zone, item: *item });
            }
            continue;
        }
        if !item.command.is_fence_polygon() {
            continue;
        }
        let Some(zone) = FenceZone::of(item.command) else {
            continue;
        };

        // A zone change inside a run means the previous polygon never closed
        if let Some(current) = run_zone {
            if current != zone && !run.is_empty() {
                shapes.polygons.push(FencePolygon {
                    zone: current,
                    vertices: core::mem::take(&mut run),
                    complete: false,
                });
            }
        }
        run_zone = Some(zone);
        run.push(*item);

        let declared = declared_count(item);
        if declared > 0 && run.len() >= declared {
            shapes.polygons.push(FencePolygon {
                zone,
                vertices: core::mem::take(&mut run),
                complete: true,
            });
            run_zone = None;
        }
    }

    if let (Some(zone), false) = (run_zone, run.is_empty()) {
        shapes.polygons.push(FencePolygon {
            zone,
            vertices: run,
            complete: false,
        });
    }

    shapes
}
