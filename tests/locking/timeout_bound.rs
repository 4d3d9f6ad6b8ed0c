use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use halyard::DisplayLock;
use serial_test::serial;

// Wall-clock assertions; keep these off the parallel scheduler.

#[test]
#[serial]
fn acquire_gives_up_soon_after_the_timeout() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");

    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = barrier.clone();
    let holder_path = lock_path.clone();
    let holder = thread::spawn(move || {
        let mut lock = DisplayLock::new(holder_path);
        assert!(lock.acquire());
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(1200));
        lock.release();
    });

    barrier.wait();
    let timeout = Duration::from_millis(300);
    let mut rival = DisplayLock::new(lock_path)
        .with_poll_interval(Duration::from_millis(25))
        .with_timeout(timeout);

    let started = Instant::now();
    assert!(!rival.acquire());
    let elapsed = started.elapsed();

    assert!(
        elapsed >= timeout,
        "gave up early: {:?} < {:?}",
        elapsed,
        timeout
    );
    // The overshoot can be at most one poll interval plus scheduler slack,
    // nowhere near the holder's 1200ms sleep.
    assert!(
        elapsed < Duration::from_millis(450),
        "kept waiting long past the timeout: {:?}",
        elapsed
    );

    holder.join().unwrap();
}

#[test]
#[serial]
fn zero_timeout_still_makes_one_attempt() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");

    // Uncontended: the single attempt must succeed.
    let mut lock = DisplayLock::new(lock_path.clone());
    assert!(lock.acquire_within(Duration::ZERO));
    lock.release();

    // Contended: the single attempt fails fast, without a poll sleep.
    let mut holder = DisplayLock::new(lock_path.clone());
    assert!(holder.acquire());

    let mut rival = DisplayLock::new(lock_path);
    let started = Instant::now();
    assert!(!rival.acquire_within(Duration::ZERO));
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "zero timeout should not wait: {:?}",
        started.elapsed()
    );
    holder.release();
}
