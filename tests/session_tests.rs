use std::path::PathBuf;
use std::sync::Arc;

use trail_planner::planning::home::{HomePosition, HomeSource};
use trail_planner::planning::mission::{
    CollectionError, MissionCommand, MissionFrame, MissionItem, MissionType,
};
use trail_planner::{MemoryLink, MissionControl, PlanSession, PlannerError, ProgressReporter};

const PLAN: &str = "QGC WPL 110\n\
    0\t1\t0\t16\t0\t0\t0\t0\t47.3977419\t8.5455938\t488.0\t1\n\
    1\t0\t3\t22\t0\t0\t0\t0\t47.3980000\t8.5460000\t20.0\t1\n\
    2\t0\t3\t16\t0\t0\t0\t0\t47.3990000\t8.5470000\t30.0\t1\n\
    3\t0\t3\t177\t1\t2\t0\t0\t0\t0\t0\t1\n";

fn temp_plan(name: &str, text: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("trail_planner_{}_{}", std::process::id(), name));
    std::fs::write(&path, text).unwrap();
    path
}

fn vehicle_home() -> HomePosition {
    HomePosition::new(473_970_000, 85_450_000, 480.0)
}

fn vehicle_mission() -> Vec<MissionItem> {
    vec![
        MissionItem::waypoint(473_970_000, 85_450_000, 480.0)
            .with_frame(MissionFrame::Global)
            .with_seq(0),
        MissionItem::waypoint(473_975_000, 85_455_000, 25.0).with_seq(1),
    ]
}

#[tokio::test]
async fn test_edit_marks_dirty() {
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    assert!(!session.has_unwritten_changes(MissionType::Rally));

    session
        .edit(MissionType::Rally, |rally| {
            rally.push(MissionItem::new(MissionCommand::RallyPoint, 1, 1, 10.0))
        })
        .unwrap();

    assert!(session.has_unwritten_changes(MissionType::Rally));
    assert!(!session.has_unwritten_changes(MissionType::Mission));
    assert_eq!(session.items(MissionType::Rally).len(), 1);
}

#[tokio::test]
async fn test_rejected_edit_stays_clean() {
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));

    let result = session.edit(MissionType::Fence, |fence| {
        fence.push(MissionItem::waypoint(1, 1, 10.0))
    });

    assert!(matches!(
        result,
        Err(PlannerError::Collection(CollectionError::CommandNotAllowed { .. }))
    ));
    assert!(!session.has_unwritten_changes(MissionType::Fence));
    assert!(session.items(MissionType::Fence).is_empty());
}

#[tokio::test]
async fn test_import_stages_home_candidate() {
    let path = temp_plan("import.waypoints", PLAN);
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));

    session.import_file(MissionType::Mission, &path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(session.items(MissionType::Mission).len(), 4);
    assert!(session.has_unwritten_changes(MissionType::Mission));
    assert!(session.planned_home().is_none());

    let pending = session.reconciler().pending().unwrap();
    assert!(matches!(pending.from, HomeSource::File(_)));
    assert_eq!(pending.position.lat, 473_977_419);

    let diff = session.home_diff().unwrap();
    assert!(diff.lat.is_changed());

    let home = session.accept_home().unwrap();
    assert_eq!(session.planned_home(), Some(&home));
    assert!(session.home_diff().is_none());
}

#[tokio::test]
async fn test_reject_keeps_planned_home() {
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    let first = HomePosition::new(10, 20, 5.0);
    assert!(session.propose_home(first, HomeSource::Operator));
    session.accept_home().unwrap();

    assert!(session.propose_home(HomePosition::new(30, 40, 5.0), HomeSource::Operator));
    let rejected = session.reject_home().unwrap();

    assert_eq!(rejected.position, HomePosition::new(30, 40, 5.0));
    assert_eq!(session.planned_home(), Some(&first));
    assert!(matches!(
        session.reject_home(),
        Err(PlannerError::Reconcile(_))
    ));
}

#[tokio::test]
async fn test_identical_candidate_skipped() {
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    let home = HomePosition::new(10, 20, 5.0);
    session.propose_home(home, HomeSource::Operator);
    session.accept_home().unwrap();

    assert!(!session.propose_home(home, HomeSource::Vehicle));
    assert!(session.reconciler().pending().is_none());
}

#[tokio::test]
async fn test_accept_home_moves_placeholder() {
    let path = temp_plan("placeholder.waypoints", PLAN);
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    session.import_file(MissionType::Mission, &path).unwrap();
    std::fs::remove_file(&path).ok();
    session.accept_home().unwrap();

    session.propose_home(vehicle_home(), HomeSource::Vehicle);
    session.accept_home().unwrap();

    let placeholder = session.items(MissionType::Mission)[0];
    assert_eq!(placeholder.x, vehicle_home().lat);
    assert_eq!(placeholder.y, vehicle_home().lon);
    assert_eq!(placeholder.z, vehicle_home().alt);
}

#[tokio::test]
async fn test_refresh_home_stages_vehicle_candidate() {
    let link = Arc::new(MemoryLink::new().with_home(vehicle_home()));
    let mut session = PlanSession::new(link.clone());

    let home = session.refresh_home().await.unwrap();

    assert_eq!(home, vehicle_home());
    assert_eq!(session.vehicle_home(), Some(&vehicle_home()));
    assert!(session.planned_home().is_none());
    assert_eq!(
        session.reconciler().pending().unwrap().from,
        HomeSource::Vehicle
    );

    link.set_home(None);
    assert!(matches!(
        session.refresh_home().await,
        Err(PlannerError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_read_overwrites_drawing_copy() {
    let link = Arc::new(MemoryLink::new().with_collection(MissionType::Mission, vehicle_mission()));
    let mut session = PlanSession::new(link);
    session
        .edit(MissionType::Mission, |mission| {
            mission.push(MissionItem::waypoint(1, 1, 1.0))
        })
        .unwrap();

    session
        .read(MissionType::Mission, &ProgressReporter::none())
        .await
        .unwrap();

    let items = session.items(MissionType::Mission);
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].x, 473_975_000);
    assert!(!session.has_unwritten_changes(MissionType::Mission));
    assert_eq!(
        session.reconciler().pending().unwrap().position,
        vehicle_home()
    );
}

#[tokio::test]
async fn test_write_then_control() {
    let path = temp_plan("upload.waypoints", PLAN);
    let link = Arc::new(MemoryLink::new());
    let mut session = PlanSession::new(link.clone());

    assert!(session.control_mission(MissionControl::Start).await.is_err());

    session.import_file(MissionType::Mission, &path).unwrap();
    std::fs::remove_file(&path).ok();
    session
        .write(MissionType::Mission, &ProgressReporter::none())
        .await
        .unwrap();

    assert!(!session.has_unwritten_changes(MissionType::Mission));
    assert_eq!(link.stored(MissionType::Mission).len(), 4);

    session.control_mission(MissionControl::Restart).await.unwrap();
    assert_eq!(link.controls(), vec![MissionControl::Restart]);
}

#[tokio::test]
async fn test_statistics_and_path() {
    let path = temp_plan("stats.waypoints", PLAN);
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    session.import_file(MissionType::Mission, &path).unwrap();
    std::fs::remove_file(&path).ok();
    session.accept_home().unwrap();

    let stats = session.statistics();
    assert!(stats.total_distance_m > 0.0);
    assert_eq!(stats.max_altitude.altitude_m, 30.0);
    assert!(stats.max_home_distance.distance_m > 0.0);

    let mission_path = session.mission_path();
    assert_eq!(mission_path.solid.len(), 2);
    assert_eq!(mission_path.dotted.len(), 1);

    assert!(session
        .validate(MissionType::Mission)
        .iter()
        .all(|issue| !issue.is_error()));
}

#[tokio::test]
async fn test_export_round_trips_file() {
    let source = temp_plan("export_src.waypoints", PLAN);
    let target = std::env::temp_dir().join(format!(
        "trail_planner_{}_export_dst.waypoints",
        std::process::id()
    ));
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    session.import_file(MissionType::Mission, &source).unwrap();
    session.export_file(MissionType::Mission, &target).unwrap();

    let mut reloaded = PlanSession::new(Arc::new(MemoryLink::new()));
    reloaded.import_file(MissionType::Mission, &target).unwrap();
    std::fs::remove_file(&source).ok();
    std::fs::remove_file(&target).ok();

    assert_eq!(
        session.items(MissionType::Mission),
        reloaded.items(MissionType::Mission)
    );
}

#[tokio::test]
async fn test_open_fence_polygon_not_complete() {
    let mut session = PlanSession::new(Arc::new(MemoryLink::new()));
    let vertex = |lat| {
        MissionItem::new(MissionCommand::FencePolygonInclusion, lat, 85_450_000, 0.0)
            .with_params(3.0, 0.0, 0.0, 0.0)
    };
    session
        .edit(MissionType::Fence, |fence| {
            fence.push(vertex(473_970_000))?;
            fence.push(vertex(473_980_000))
        })
        .unwrap();

    let shapes = session.fence_shapes();

    assert_eq!(shapes.polygons.len(), 1);
    assert_eq!(shapes.complete_polygons().count(), 0);

    session
        .edit(MissionType::Fence, |fence| fence.push(vertex(473_990_000)))
        .unwrap();
    assert_eq!(session.fence_shapes().complete_polygons().count(), 1);
}
