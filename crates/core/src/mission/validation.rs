//! Plan validation
//!
//! Checks a collection before upload. Errors block a write; warnings are
//! reported alongside.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::{MissionCommand, MissionItem, MissionType};
use crate::fence::classify_fence;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionIssue {
    /// Machine-readable code, e.g. `jump_target_unresolved`
    pub code: &'static str,
    pub message: String,
    /// Sequence number of the offending item, if any
    pub seq: Option<u16>,
    pub severity: IssueSeverity,
}

impl MissionIssue {
    fn error(code: &'static str, seq: Option<u16>, message: String) -> Self {
        Self {
            code,
            message,
            seq,
            severity: IssueSeverity::Error,
        }
    }

    fn warning(code: &'static str, seq: Option<u16>, message: String) -> Self {
        Self {
            code,
            message,
            seq,
            severity: IssueSeverity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// Validate `items` as a collection of `mission_type`.
///
/// Returns every finding; an empty list means the collection is clean.
pub fn validate_items(mission_type: MissionType, items: &[MissionItem]) -> Vec<MissionIssue> {
    let mut issues = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if item.seq as usize != index {
            issues.push(MissionIssue::error(
                "seq_not_contiguous",
                Some(item.seq),
                format!("item at index {} has seq {}", index, item.seq),
            ));
        }

        if !item.command.allowed_in(mission_type) {
            issues.push(MissionIssue::error(
                "command_not_allowed",
                Some(item.seq),
                format!(
                    "command {} not allowed in {} collection",
                    item.command.code(),
                    mission_type
                ),
            ));
        }

        if item.command == MissionCommand::Jump {
            check_jump(items, index, item, &mut issues);
        } else if super::cmd_has_location(item.command) && !item.has_coordinate() {
            issues.push(MissionIssue::warning(
                "missing_coordinate",
                Some(item.seq),
                format!("item {} has no coordinate", item.seq),
            ));
        }
    }

    if mission_type == MissionType::Fence {
        check_fence(items, &mut issues);
    }

    issues
}

fn check_jump(items: &[MissionItem], index: usize, item: &MissionItem, issues: &mut Vec<MissionIssue>) {
    let Some(target) = item.jump_target() else {
        issues.push(MissionIssue::error(
            "jump_target_unresolved",
            Some(item.seq),
            format!("jump {} has an invalid target {}", item.seq, item.param1),
        ));
        return;
    };

    if items[..index].iter().any(|candidate| candidate.seq == target) {
        return;
    }
    if items[index..].iter().any(|candidate| candidate.seq == target) {
        issues.push(MissionIssue::error(
            "jump_target_forward",
            Some(item.seq),
            format!("jump {} targets item {} at or after itself", item.seq, target),
        ));
    } else {
        issues.push(MissionIssue::error(
            "jump_target_unresolved",
            Some(item.seq),
            format!("jump {} targets missing item {}", item.seq, target),
        ));
    }
}

fn check_fence(items: &[MissionItem], issues: &mut Vec<MissionIssue>) {
    let shapes = classify_fence(items);

    for polygon in &shapes.polygons {
        let first_seq = polygon.vertices.first().map(|vertex| vertex.seq);
        if !polygon.complete {
            issues.push(MissionIssue::error(
                "fence_polygon_open",
                first_seq,
                format!(
                    "polygon has {} of {} declared vertices",
                    polygon.vertices.len(),
                    polygon.declared_vertices()
                ),
            ));
        } else if polygon.vertices.len() < 3 {
            issues.push(MissionIssue::error(
                "fence_polygon_too_few_vertices",
                first_seq,
                format!("polygon has only {} vertices", polygon.vertices.len()),
            ));
        }
    }

    for circle in &shapes.circles {
        if circle.radius_m() <= 0.0 {
            issues.push(MissionIssue::error(
                "fence_circle_radius",
                Some(circle.item.seq),
                format!("circle {} has radius {}", circle.item.seq, circle.radius_m()),
            ));
        }
    }
}
