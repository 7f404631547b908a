//! Driver tests on tokio's paused clock

use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyspark_config::NarratorConfig;
use storyspark_narrator::{spawn_driver, Expression, ExpressionSynchronizer, DEFAULT_TICK};
use tokio::time::{self, Instant};

fn active_sync(base: Expression) -> Arc<Mutex<ExpressionSynchronizer>> {
    let mut sync = ExpressionSynchronizer::new(NarratorConfig {
        mood_change_probability: 0.0,
        ..NarratorConfig::default()
    });
    sync.set_story(base, "");
    sync.activate(Instant::now().into_std());
    Arc::new(Mutex::new(sync))
}

#[tokio::test(start_paused = true)]
async fn test_driver_publishes_blink() {
    let sync = active_sync(Expression::Happy);
    let handle = spawn_driver(Arc::clone(&sync), DEFAULT_TICK);
    let mut snapshots = handle.snapshots();
    let started = Instant::now();

    snapshots.changed().await.unwrap();
    let snapshot = *snapshots.borrow_and_update();

    assert!(snapshot.blinking);
    assert_eq!(snapshot.expression, Expression::Happy);
    assert!(started.elapsed() >= Duration::from_millis(3_200));
}

#[tokio::test(start_paused = true)]
async fn test_blink_is_released() {
    let sync = active_sync(Expression::Neutral);
    let _handle = spawn_driver(Arc::clone(&sync), DEFAULT_TICK);

    time::sleep(Duration::from_millis(3_275)).await;
    assert!(sync.lock().unwrap().snapshot().blinking);

    time::sleep(Duration::from_millis(200)).await;
    assert!(!sync.lock().unwrap().snapshot().blinking);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_driver_leaves_timers_alone() {
    let sync = active_sync(Expression::Neutral);
    let handle = spawn_driver(Arc::clone(&sync), DEFAULT_TICK);
    handle.stop();

    time::sleep(Duration::from_millis(3_275)).await;
    assert!(handle.is_finished());
    assert!(!sync.lock().unwrap().snapshot().blinking);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_driver() {
    let sync = active_sync(Expression::Neutral);
    drop(spawn_driver(Arc::clone(&sync), DEFAULT_TICK));

    time::sleep(Duration::from_millis(10_000)).await;
    assert!(!sync.lock().unwrap().snapshot().blinking);
    assert_eq!(Arc::strong_count(&sync), 1);
}
