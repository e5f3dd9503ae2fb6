//! Offline plan file inspection.
//!
//! Prints statistics, fence shapes and validation findings for a plan file.
//!
//! Usage:
//!   cargo run --bin plan_inspect -- <FILE> [OPTIONS]
//!
//! Options:
//!   -t, --type <TYPE>   Collection type: mission, fence or rally (default: mission)

use std::env;
use std::process;

use trail_planner::planning::fence::classify_fence;
use trail_planner::planning::home::HomePosition;
use trail_planner::planning::mission::{
    filter_items, is_home_placeholder, validate_items, ItemCollection, IssueSeverity, MissionType,
};
use trail_planner::planning::path::unresolved_jumps;
use trail_planner::planning::statistics::MissionStatistics;
use trail_planner::plan_file::import_mission_from_file;

struct Args {
    path: String,
    mission_type: MissionType,
}

fn parse_args() -> Args {
    let mut path = None;
    let mut mission_type = MissionType::Mission;

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-t" | "--type" => {
                i += 1;
                mission_type = raw
                    .get(i)
                    .and_then(|name| MissionType::from_name(name))
                    .unwrap_or_else(|| {
                        eprintln!("Error: --type requires mission, fence or rally");
                        process::exit(1);
                    });
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
            other => path = Some(other.to_string()),
        }
        i += 1;
    }

    let Some(path) = path else {
        eprintln!("Error: plan file required");
        print_usage();
        process::exit(1);
    };

    Args { path, mission_type }
}

fn print_usage() {
    eprintln!(
        "Usage: plan_inspect <FILE> [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -t, --type <TYPE>  mission, fence or rally (default: mission)\n\
         \x20 -h, --help         Show this help"
    );
}

fn print_mission(collection: &ItemCollection) {
    let raw = collection.items();
    let home = is_home_placeholder(raw).then(|| HomePosition::from_item(&raw[0]));
    let stats = MissionStatistics::compute(raw, home.as_ref());

    println!("Waypoints:         {}", filter_items(raw).len());
    println!("Total distance:    {:.2} m", stats.total_distance_m);
    if let Some((a, b)) = stats.max_leg.items {
        println!(
            "Longest leg:       {:.1} m (item {} -> {})",
            stats.max_leg.distance_m, a.seq, b.seq
        );
    }
    if let Some(item) = stats.max_altitude.item {
        println!(
            "Max altitude:      {:.1} m (item {})",
            stats.max_altitude.altitude_m, item.seq
        );
    }
    if let Some((a, b)) = stats.max_gradient.items {
        println!(
            "Max gradient:      {:.1} % (item {} -> {})",
            stats.max_gradient.percent, a.seq, b.seq
        );
    }
    if let Some(item) = stats.max_home_distance.item {
        println!(
            "Max home distance: {:.1} m (item {})",
            stats.max_home_distance.distance_m, item.seq
        );
    }
    for jump in unresolved_jumps(raw) {
        log::warn!("Jump {} has an unresolved target {}", jump.seq, jump.param1);
    }
}

fn print_fence(collection: &ItemCollection) {
    let shapes = classify_fence(collection.items());
    for polygon in &shapes.polygons {
        println!(
            "Polygon {:?}: {} vertices{}",
            polygon.zone,
            polygon.vertices.len(),
            if polygon.complete { "" } else { " (incomplete)" }
        );
    }
    for circle in &shapes.circles {
        println!("Circle {:?}: radius {:.1} m", circle.zone, circle.radius_m());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();

    let items = match import_mission_from_file(args.mission_type, &args.path) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let collection = ItemCollection::from_items(args.mission_type, items);

    println!("=== {} ({}, {} items) ===", args.path, args.mission_type, collection.len());
    match args.mission_type {
        MissionType::Mission => print_mission(&collection),
        MissionType::Fence => print_fence(&collection),
        MissionType::Rally => {}
    }

    let issues = validate_items(args.mission_type, collection.items());
    let errors = issues
        .iter()
        .filter(|issue| issue.severity == IssueSeverity::Error)
        .count();
    for issue in &issues {
        let seq = issue.seq.map(|seq| seq.to_string()).unwrap_or_default();
        println!("{:?} [{}] {}: {}", issue.severity, seq, issue.code, issue.message);
    }
    if errors > 0 {
        process::exit(2);
    }
}
