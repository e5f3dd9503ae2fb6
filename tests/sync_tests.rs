use std::sync::Arc;
use std::time::Duration;

use trail_planner::planning::mission::{MissionItem, MissionType};
use trail_planner::planning::sync::{SyncError, SyncPhase};
use trail_planner::{MemoryLink, PlannerError, ProgressReporter, SyncTracker};

fn mission() -> Vec<MissionItem> {
    vec![
        MissionItem::waypoint(473_977_420, 85_455_940, 10.0).with_seq(0),
        MissionItem::waypoint(473_980_000, 85_460_000, 15.0).with_seq(1),
    ]
}

fn slow_link() -> Arc<MemoryLink> {
    Arc::new(MemoryLink::new().with_latency(Duration::from_millis(30)))
}

#[tokio::test]
async fn test_write_clears_unwritten_changes() {
    let link = Arc::new(MemoryLink::new());
    let tracker = SyncTracker::new(link.clone());
    tracker.mark_dirty(MissionType::Mission);
    assert!(tracker.has_unwritten_changes(MissionType::Mission));

    tracker
        .write(MissionType::Mission, mission(), &ProgressReporter::none())
        .await
        .unwrap();

    assert!(!tracker.has_unwritten_changes(MissionType::Mission));
    assert_eq!(tracker.confirmed(MissionType::Mission), mission());
    assert_eq!(link.stored(MissionType::Mission), mission());
    assert_eq!(tracker.phase(MissionType::Mission), SyncPhase::Idle);
}

#[tokio::test]
async fn test_clean_collection_not_written() {
    let link = Arc::new(MemoryLink::new().with_collection(MissionType::Mission, mission()));
    let tracker = SyncTracker::new(link.clone());

    tracker
        .write(MissionType::Mission, Vec::new(), &ProgressReporter::none())
        .await
        .unwrap();

    assert_eq!(link.write_count(), 0);
    assert_eq!(link.stored(MissionType::Mission), mission());
    assert_eq!(tracker.phase(MissionType::Mission), SyncPhase::Idle);

    tracker.mark_dirty(MissionType::Mission);
    tracker
        .write(MissionType::Mission, Vec::new(), &ProgressReporter::none())
        .await
        .unwrap();
    assert_eq!(link.write_count(), 1);
    assert!(link.stored(MissionType::Mission).is_empty());
}

#[tokio::test]
async fn test_failed_write_keeps_unwritten_changes() {
    let link = Arc::new(MemoryLink::new());
    let tracker = SyncTracker::new(link.clone());
    tracker.mark_dirty(MissionType::Fence);
    link.fail_next_writes(1);

    let result = tracker
        .write(MissionType::Fence, mission(), &ProgressReporter::none())
        .await;

    assert!(matches!(result, Err(PlannerError::VehicleRejected { .. })));
    assert!(tracker.has_unwritten_changes(MissionType::Fence));
    assert!(tracker.confirmed(MissionType::Fence).is_empty());
    assert_eq!(tracker.phase(MissionType::Fence), SyncPhase::Idle);
}

#[tokio::test]
async fn test_concurrent_write_same_collection_rejected() {
    let link = slow_link();
    let tracker = SyncTracker::new(link.clone());
    tracker.mark_dirty(MissionType::Mission);
    let progress = ProgressReporter::none();

    let (first, second) = tokio::join!(
        tracker.write(MissionType::Mission, mission(), &progress),
        tracker.write(MissionType::Mission, Vec::new(), &progress),
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(PlannerError::Sync(SyncError::Busy {
            mission_type: MissionType::Mission,
            phase: SyncPhase::Writing,
        }))
    ));
    assert_eq!(link.write_count(), 1);
    assert_eq!(link.stored(MissionType::Mission), mission());
}

#[tokio::test]
async fn test_read_while_writing_rejected() {
    let tracker = SyncTracker::new(slow_link());
    tracker.mark_dirty(MissionType::Rally);
    let progress = ProgressReporter::none();

    let (write, read) = tokio::join!(
        tracker.write(MissionType::Rally, mission(), &progress),
        tracker.read(MissionType::Rally, &progress),
    );

    assert!(write.is_ok());
    assert!(matches!(read, Err(PlannerError::Sync(SyncError::Busy { .. }))));
}

#[tokio::test]
async fn test_different_collections_independent() {
    let link = slow_link();
    let tracker = SyncTracker::new(link.clone());
    tracker.mark_dirty(MissionType::Mission);
    tracker.mark_dirty(MissionType::Fence);
    let progress = ProgressReporter::none();

    let (mission_write, fence_write, rally_read) = tokio::join!(
        tracker.write(MissionType::Mission, mission(), &progress),
        tracker.write(MissionType::Fence, mission(), &progress),
        tracker.read(MissionType::Rally, &progress),
    );

    assert!(mission_write.is_ok());
    assert!(fence_write.is_ok());
    assert!(rally_read.unwrap().is_empty());
    assert_eq!(link.write_count(), 2);
}

#[tokio::test]
async fn test_edit_during_write_stays_dirty() {
    let tracker = SyncTracker::new(slow_link());
    tracker.mark_dirty(MissionType::Mission);
    let progress = ProgressReporter::none();

    let (result, ()) = tokio::join!(
        tracker.write(
            MissionType::Mission,
            mission(),
            &progress
        ),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            tracker.mark_dirty(MissionType::Mission);
        },
    );

    assert!(result.is_ok());
    assert_eq!(tracker.confirmed(MissionType::Mission), mission());
    assert!(tracker.has_unwritten_changes(MissionType::Mission));
}

#[tokio::test]
async fn test_read_replaces_confirmed_and_clears_dirty() {
    let link = Arc::new(MemoryLink::new().with_collection(MissionType::Mission, mission()));
    let tracker = SyncTracker::new(link);
    tracker.mark_dirty(MissionType::Mission);

    let items = tracker
        .read(MissionType::Mission, &ProgressReporter::none())
        .await
        .unwrap();

    assert_eq!(items, mission());
    assert_eq!(tracker.confirmed(MissionType::Mission), mission());
    assert!(!tracker.has_unwritten_changes(MissionType::Mission));
}

#[tokio::test]
async fn test_failed_read_leaves_state() {
    let link = Arc::new(MemoryLink::new().with_collection(MissionType::Mission, mission()));
    let tracker = SyncTracker::new(link.clone());
    tracker.mark_dirty(MissionType::Mission);
    link.fail_next_reads(1);

    let result = tracker
        .read(MissionType::Mission, &ProgressReporter::none())
        .await;

    assert!(matches!(result, Err(PlannerError::Timeout(_))));
    assert!(tracker.has_unwritten_changes(MissionType::Mission));
    assert!(tracker.confirmed(MissionType::Mission).is_empty());
    assert_eq!(tracker.phase(MissionType::Mission), SyncPhase::Idle);
}

#[tokio::test]
async fn test_cancelled_write_returns_to_idle() {
    let tracker = SyncTracker::new(slow_link());
    tracker.mark_dirty(MissionType::Mission);

    let cancelled = tokio::time::timeout(
        Duration::from_millis(5),
        tracker.write(MissionType::Mission, mission(), &ProgressReporter::none()),
    )
    .await;

    assert!(cancelled.is_err());
    assert_eq!(tracker.phase(MissionType::Mission), SyncPhase::Idle);
    assert!(tracker.has_unwritten_changes(MissionType::Mission));

    tracker
        .write(MissionType::Mission, mission(), &ProgressReporter::none())
        .await
        .unwrap();
    assert!(!tracker.has_unwritten_changes(MissionType::Mission));
}

#[tokio::test]
async fn test_progress_reported() {
    let tracker = SyncTracker::new(Arc::new(MemoryLink::new()));
    tracker.mark_dirty(MissionType::Mission);
    let (progress, mut updates) = ProgressReporter::channel();

    tracker
        .write(MissionType::Mission, mission(), &progress)
        .await
        .unwrap();

    let mut last = None;
    while let Ok(update) = updates.try_recv() {
        assert_eq!(update.mission_type, MissionType::Mission);
        assert_eq!(update.total_items, 2);
        last = Some(update.current_index);
    }
    assert_eq!(last, Some(2));
}
