//! Vehicle mission sync over MAVLink UDP.
//!
//! Usage:
//!   cargo run --bin plan_sync -- [OPTIONS] <COMMAND>
//!
//! Commands:
//!   download <TYPE> <FILE>   Read a collection from the vehicle into a plan file
//!   upload <TYPE> <FILE>     Write a plan file to the vehicle
//!   home                     Query the vehicle home position
//!   start                    Start the mission
//!   restart                  Restart the mission from the first item
//!
//! Options:
//!   -c, --config <FILE>      JSON configuration file
//!   --bind <ADDR>            Local UDP address (overrides config)
//!   --vehicle <ADDR>         Vehicle UDP address (overrides config)

use std::env;
use std::process;
use std::sync::Arc;

use trail_planner::communication::mavlink::{LinkSettings, MavlinkLink, UdpTransport};
use trail_planner::planning::mission::MissionType;
use trail_planner::{MissionControl, PlanSession, PlannerConfig, ProgressReporter, Result};

enum Command {
    Download { mission_type: MissionType, path: String },
    Upload { mission_type: MissionType, path: String },
    Home,
    Control(MissionControl),
}

struct Args {
    config: Option<String>,
    bind: Option<String>,
    vehicle: Option<String>,
    command: Command,
}

fn parse_args() -> Args {
    let mut config = None;
    let mut bind = None;
    let mut vehicle = None;
    let mut positional = Vec::new();

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                config = Some(string_arg(&raw, i, "config"));
            }
            "--bind" => {
                i += 1;
                bind = Some(string_arg(&raw, i, "bind"));
            }
            "--vehicle" => {
                i += 1;
                vehicle = Some(string_arg(&raw, i, "vehicle"));
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
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match positional.as_slice() {
        [cmd, kind, path] if cmd == "download" => Command::Download {
            mission_type: parse_type(kind),
            path: path.clone(),
        },
        [cmd, kind, path] if cmd == "upload" => Command::Upload {
            mission_type: parse_type(kind),
            path: path.clone(),
        },
        [cmd] if cmd == "home" => Command::Home,
        [cmd] if cmd == "start" => Command::Control(MissionControl::Start),
        [cmd] if cmd == "restart" => Command::Control(MissionControl::Restart),
        _ => {
            eprintln!("Error: missing or invalid command");
            print_usage();
            process::exit(1);
        }
    };

    Args {
        config,
        bind,
        vehicle,
        command,
    }
}

fn string_arg(raw: &[String], i: usize, name: &str) -> String {
    raw.get(i).cloned().unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn parse_type(name: &str) -> MissionType {
    MissionType::from_name(name).unwrap_or_else(|| {
        eprintln!("Error: unknown collection type {name} (mission, fence or rally)");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: plan_sync [OPTIONS] <COMMAND>\n\
         \n\
         Commands:\n\
         \x20 download <TYPE> <FILE>  Read a collection from the vehicle into a plan file\n\
         \x20 upload <TYPE> <FILE>    Write a plan file to the vehicle\n\
         \x20 home                    Query the vehicle home position\n\
         \x20 start                   Start the mission\n\
         \x20 restart                 Restart the mission from the first item\n\
         \n\
         Options:\n\
         \x20 -c, --config <FILE>     JSON configuration file\n\
         \x20 --bind <ADDR>           Local UDP address (default: 0.0.0.0:14551)\n\
         \x20 --vehicle <ADDR>        Vehicle UDP address (default: discovered)\n\
         \x20 -h, --help              Show this help"
    );
}

fn load_config(args: &Args) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(vehicle) = &args.vehicle {
        config.vehicle_addr = Some(vehicle.clone());
    }
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let transport = UdpTransport::bind(
        config.bind_socket_addr()?,
        config.vehicle_socket_addr()?,
        config.gcs_system_id,
        config.gcs_component_id,
    )
    .await?;
    let link = Arc::new(MavlinkLink::new(transport, LinkSettings::from(&config)));
    let mut session = PlanSession::new(link);

    let (progress, mut updates) = ProgressReporter::channel();
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            log::debug!(
                "{} transfer: {}/{}",
                update.mission_type,
                update.current_index,
                update.total_items
            );
        }
    });

    match args.command {
        Command::Download { mission_type, path } => {
            session.read(mission_type, &progress).await?;
            session.export_file(mission_type, &path)?;
            println!(
                "Downloaded {} {} items to {}",
                session.items(mission_type).len(),
                mission_type,
                path
            );
        }
        Command::Upload { mission_type, path } => {
            session.import_file(mission_type, &path)?;
            session.write(mission_type, &progress).await?;
            println!(
                "Uploaded {} {} items from {}",
                session.items(mission_type).len(),
                mission_type,
                path
            );
        }
        Command::Home => {
            let home = session.refresh_home().await?;
            println!(
                "Home: {:.7}, {:.7}, {:.2} m",
                home.latitude(),
                home.longitude(),
                home.alt
            );
        }
        Command::Control(control) => {
            session.control_mission(control).await?;
            println!("Mission {:?} accepted", control);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
