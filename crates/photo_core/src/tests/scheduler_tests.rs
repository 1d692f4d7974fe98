use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_callback(counter: &Arc<AtomicUsize>) -> TickCallback {
    let counter = Arc::clone(counter);
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn manual_scheduler_fires_once_per_elapsed_interval() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let _handle =
        scheduler.schedule_repeating(Duration::from_millis(300), counting_callback(&counter));

    assert_eq!(scheduler.advance(Duration::from_millis(299)), 0);
    assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
    assert_eq!(scheduler.advance(Duration::from_millis(900)), 3);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    assert_eq!(scheduler.now(), Duration::from_millis(1200));
}

#[test]
fn dropping_handle_cancels_callback() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let handle =
        scheduler.schedule_repeating(Duration::from_millis(10), counting_callback(&counter));
    assert_eq!(scheduler.pending(), 1);

    drop(handle);
    assert_eq!(scheduler.pending(), 0);
    assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn explicit_cancel_matches_drop() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let handle =
        scheduler.schedule_repeating(Duration::from_millis(10), counting_callback(&counter));
    scheduler.advance(Duration::from_millis(10));

    handle.cancel();
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn callbacks_fire_in_due_time_order() {
    let scheduler = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let slow_order = Arc::clone(&order);
    let _slow = scheduler.schedule_repeating(
        Duration::from_millis(30),
        Box::new(move || slow_order.lock().expect("order").push("slow")),
    );
    let fast_order = Arc::clone(&order);
    let _fast = scheduler.schedule_repeating(
        Duration::from_millis(20),
        Box::new(move || fast_order.lock().expect("order").push("fast")),
    );

    scheduler.advance(Duration::from_millis(60));
    assert_eq!(
        *order.lock().expect("order"),
        vec!["fast", "slow", "fast", "slow", "fast"]
    );
}

#[test]
fn zero_interval_is_clamped() {
    let scheduler = ManualScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let _handle = scheduler.schedule_repeating(Duration::ZERO, counting_callback(&counter));

    assert_eq!(scheduler.advance(Duration::from_millis(5)), 5);
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_ticks_until_cancelled() {
    let scheduler = TokioScheduler::from_current().expect("runtime");
    let counter = Arc::new(AtomicUsize::new(0));
    let handle =
        scheduler.schedule_repeating(Duration::from_millis(300), counting_callback(&counter));

    tokio::time::sleep(Duration::from_millis(950)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    drop(handle);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}
