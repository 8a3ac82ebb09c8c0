use robolink_core::{MoveType, Pose, PositionPoint};
use robolink_model::{MotionInterpolator, MotionOutcome, MOTION_STEPS};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn target(speed: f64) -> PositionPoint {
    PositionPoint::new(
        Pose::new(100.0, -50.0, 25.0, 0.0, 45.0, 90.0),
        MoveType::Linear,
        speed,
    )
}

#[tokio::test(start_paused = true)]
async fn test_uninterrupted_motion_ends_exactly_on_target() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    let point = target(50.0);
    let mut applied = Vec::new();

    let outcome = interpolator
        .interpolate(Pose::default(), &point, &cancel, |pose| applied.push(*pose))
        .await;

    assert_eq!(outcome, MotionOutcome::Completed { steps: MOTION_STEPS });
    // One pose per step plus the final snap
    assert_eq!(applied.len(), MOTION_STEPS as usize + 1);
    assert_eq!(*applied.last().unwrap(), point.pose());

    let halfway = applied[MOTION_STEPS as usize / 2 - 1];
    assert!((halfway.x - 50.0).abs() < 1e-6);
    assert!((halfway.w - 45.0).abs() < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_motion_takes_distance_over_speed() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    // Location distance 100 dominates rotation distance 10
    let point = PositionPoint::new(
        Pose::new(100.0, 0.0, 0.0, 10.0, 0.0, 0.0),
        MoveType::Fine,
        20.0,
    );

    let start = tokio::time::Instant::now();
    interpolator
        .interpolate(Pose::default(), &point, &cancel, |_| {})
        .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(4900), "{:?}", elapsed);
    assert!(elapsed <= Duration::from_millis(6100), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_step_k_stops_without_snap() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    let point = target(50.0);
    let k = 250;
    let mut applied: Vec<Pose> = Vec::new();

    let outcome = interpolator
        .interpolate(Pose::default(), &point, &cancel, |pose| {
            applied.push(*pose);
            if applied.len() == k {
                cancel.cancel();
            }
        })
        .await;

    assert_eq!(outcome, MotionOutcome::Cancelled { steps: k as u32 });
    assert_eq!(applied.len(), k);
    let last = applied.last().unwrap();
    assert_ne!(*last, point.pose());
    assert!((last.x - 25.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_cancelled_before_start_applies_nothing() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut count = 0;

    let outcome = interpolator
        .interpolate(Pose::default(), &target(50.0), &cancel, |_| count += 1)
        .await;

    assert_eq!(outcome, MotionOutcome::Cancelled { steps: 0 });
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_non_positive_speed_moves_nothing() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();

    for speed in [0.0, -5.0, f64::INFINITY] {
        let mut count = 0;
        let outcome = interpolator
            .interpolate(Pose::default(), &target(speed), &cancel, |_| count += 1)
            .await;
        assert_eq!(outcome, MotionOutcome::Rejected);
        assert_eq!(count, 0);
    }
}

#[tokio::test]
async fn test_zero_distance_still_steps() {
    let interpolator = MotionInterpolator::with_steps(10);
    let cancel = CancellationToken::new();
    let pose = Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0);
    let mut applied = Vec::new();

    let outcome = interpolator
        .interpolate(pose, &PositionPoint::new(pose, MoveType::Linear, 1.0), &cancel, |p| {
            applied.push(*p)
        })
        .await;

    assert_eq!(outcome, MotionOutcome::Completed { steps: 10 });
    assert_eq!(applied.len(), 11);
    assert!(applied.iter().all(|p| *p == pose));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_step_wait_applies_no_further_step() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    // 100 units at speed 10: one step every 10 ms
    let point = PositionPoint::new(
        Pose::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        MoveType::Linear,
        10.0,
    );
    let applied = Arc::new(AtomicU32::new(0));

    let task = {
        let cancel = cancel.clone();
        let applied = applied.clone();
        tokio::spawn(async move {
            interpolator
                .interpolate(Pose::default(), &point, &cancel, |_| {
                    applied.fetch_add(1, Ordering::SeqCst);
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(55)).await;
    cancel.cancel();
    let before = applied.load(Ordering::SeqCst);
    let outcome = task.await.unwrap();

    assert_eq!(before, 5);
    assert_eq!(applied.load(Ordering::SeqCst), before);
    assert_eq!(outcome, MotionOutcome::Cancelled { steps: before });
}

#[tokio::test]
async fn test_fast_motion_keeps_planned_duration() {
    let interpolator = MotionInterpolator::new();
    let cancel = CancellationToken::new();
    // 10 units at speed 100: 0.1 s spread over 1000 sub-millisecond steps
    let point = PositionPoint::new(
        Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        MoveType::Linear,
        100.0,
    );

    let start = std::time::Instant::now();
    let outcome = interpolator
        .interpolate(Pose::default(), &point, &cancel, |_| {})
        .await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, MotionOutcome::Completed { steps: MOTION_STEPS });
    assert!(elapsed >= Duration::from_millis(100), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(500), "{:?}", elapsed);
}
