//! Plan file import and export
//!
//! Collections are stored in the QGC WPL 110 text format: a header line
//! followed by one tab-separated row per item.
//!
//! ```text
//! QGC WPL 110
//! <seq> <current> <frame> <command> <p1> <p2> <p3> <p4> <lat> <lon> <alt> <autocontinue>
//! ```
//!
//! Latitude and longitude are written in degrees; items use degrees * 1e7.

use std::fmt::Write as _;
use std::path::Path;

use log::{debug, info};
use trail_planner_core::mission::{MissionCommand, MissionFrame, MissionItem, MissionType};

use crate::error::{PlannerError, Result};

/// First line of every plan file.
pub const WPL_HEADER: &str = "QGC WPL 110";

const FIELD_COUNT: usize = 12;

/// Read a collection from a plan file.
///
/// Rows are returned in file order with `seq` as written; identity is
/// assigned when a collection adopts them. Commands are not checked against
/// `mission_type`.
pub fn import_mission_from_file(
    mission_type: MissionType,
    path: impl AsRef<Path>,
) -> Result<Vec<MissionItem>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let items = parse_plan(&text)?;
    info!(
        "Imported {} {} items from {}",
        items.len(),
        mission_type,
        path.display()
    );
    Ok(items)
}

/// Write a collection to a plan file, replacing any existing file.
pub fn export_mission_to_file(
    mission_type: MissionType,
    path: impl AsRef<Path>,
    items: &[MissionItem],
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format_plan(items))?;
    info!(
        "Exported {} {} items to {}",
        items.len(),
        mission_type,
        path.display()
    );
    Ok(())
}

/// Parse plan file text.
pub fn parse_plan(text: &str) -> Result<Vec<MissionItem>> {
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim() == WPL_HEADER => {}
        Some((_, header)) => {
            return Err(PlannerError::PlanFile {
                line: 1,
                reason: format!("unsupported header {:?}", header.trim()),
            })
        }
        None => {
            return Err(PlannerError::PlanFile {
                line: 1,
                reason: "empty file".to_string(),
            })
        }
    }

    let mut items = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let item = parse_row(line).map_err(|reason| PlannerError::PlanFile {
            line: line_no,
            reason,
        })?;
        items.push(item);
    }
    debug!("Parsed {} plan rows", items.len());
    Ok(items)
}

fn parse_row(line: &str) -> std::result::Result<MissionItem, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        ));
    }

    let seq: u16 = parse_field(fields[0], "seq")?;
    let frame: u8 = parse_field(fields[2], "frame")?;
    let command: u16 = parse_field(fields[3], "command")?;
    let params: [f32; 4] = [
        parse_field(fields[4], "param1")?,
        parse_field(fields[5], "param2")?,
        parse_field(fields[6], "param3")?,
        parse_field(fields[7], "param4")?,
    ];
    let lat: f64 = parse_field(fields[8], "latitude")?;
    let lon: f64 = parse_field(fields[9], "longitude")?;
    let alt: f32 = parse_field(fields[10], "altitude")?;

    Ok(MissionItem::new(
        MissionCommand::from_code(command),
        degrees_to_scaled(lat, "latitude")?,
        degrees_to_scaled(lon, "longitude")?,
        alt,
    )
    .with_frame(MissionFrame::from_code(frame))
    .with_params(params[0], params[1], params[2], params[3])
    .with_seq(seq))
}

fn parse_field<T: std::str::FromStr>(text: &str, name: &str) -> std::result::Result<T, String> {
    text.parse()
        .map_err(|_| format!("invalid {name} value {text:?}"))
}

fn degrees_to_scaled(degrees: f64, name: &str) -> std::result::Result<i32, String> {
    let scaled = (degrees * 1e7).round();
    if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(format!("{name} {degrees} out of range"));
    }
    Ok(scaled as i32)
}

/// Render items as plan file text.
pub fn format_plan(items: &[MissionItem]) -> String {
    let mut text = String::with_capacity(64 * (items.len() + 1));
    text.push_str(WPL_HEADER);
    text.push('\n');
    for (index, item) in items.iter().enumerate() {
        let current = u8::from(index == 0);
        let _ = writeln!(
            text,
            "{}\t{}\t{}\t{}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.6}\t1",
            index,
            current,
            item.frame.code(),
            item.command.code(),
            item.param1,
            item.param2,
            item.param3,
            item.param4,
            item.latitude(),
            item.longitude(),
            item.z,
        );
    }
    text
}
