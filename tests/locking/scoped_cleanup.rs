use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use halyard::DisplayLock;

#[test]
fn with_lock_runs_and_releases() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");
    let mut lock = DisplayLock::new(lock_path.clone());

    let ran = lock.with_lock(|| {
        assert!(lock_path.exists(), "held while the work runs");
        42
    });
    assert_eq!(ran, Some(42));
    assert!(!lock.is_acquired());
    assert!(!lock_path.exists());
}

#[test]
fn with_lock_skips_the_work_when_busy() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");

    let mut holder = DisplayLock::new(lock_path.clone());
    assert!(holder.acquire());

    let mut rival = DisplayLock::new(lock_path)
        .with_poll_interval(Duration::from_millis(10))
        .with_timeout(Duration::from_millis(50));
    let mut ran = false;
    let result = rival.with_lock(|| {
        ran = true;
    });
    assert_eq!(result, None);
    assert!(!ran, "work must not run without the lock");
    assert!(holder.is_acquired());
    holder.release();
}

#[test]
fn scoped_guard_reports_its_acquisition() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");
    let mut lock = DisplayLock::new(lock_path.clone());

    {
        let scope = lock.scoped();
        assert!(scope.acquired());
        assert_eq!(scope.path(), lock_path.as_path());
    }
    assert!(!lock_path.exists(), "scope exit released the lock");
}

#[test]
fn a_panicking_scope_still_releases() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");
    let mut lock = DisplayLock::new(lock_path.clone());

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ran: Option<()> = lock.with_lock(|| panic!("render blew up"));
    }));
    assert!(outcome.is_err(), "the panic propagates");
    assert!(!lock.is_acquired(), "unwinding released the lock");

    let mut next = DisplayLock::new(lock_path);
    assert!(next.acquire(), "lock is free again after the panic");
    next.release();
}
