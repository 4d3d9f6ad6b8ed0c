use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use halyard::adapters::lock::{Claim, LockBackend, MemoryBackend};
use halyard::{DisplayConfig, DisplayLock, DisplayManager, Frame, MockDisplay, UpdateOutcome};

use crate::helpers::panels::TestPanel;
use crate::helpers::sinks::{CollectingAudit, CollectingEmitter};

fn virtual_lock_config(path: &str, timeout_secs: u64) -> DisplayConfig {
    let mut config = DisplayConfig::default();
    config.lock.path = Some(PathBuf::from(path));
    config.lock.timeout_secs = timeout_secs;
    config.lock.poll_interval_ms = 5;
    config
}

#[test]
fn a_busy_lock_skips_the_update_without_touching_the_panel() {
    let backend = MemoryBackend::new();
    let config = virtual_lock_config("/virtual/session.lock", 0);
    let entry = config.lock.resolved_path();

    let mut rival = backend.open_entry(&entry, "rival\n").unwrap();
    assert_eq!(rival.try_claim().unwrap(), Claim::Held);

    let panel = TestPanel::physical();
    let log = panel.log_handle();
    let mgr = DisplayManager::new(CollectingEmitter::default(), CollectingAudit::default(), config)
        .with_driver(Box::new(panel))
        .with_lock_backend(Arc::new(backend.clone()));

    assert_eq!(
        mgr.render(&Frame::solid(2, 2, 0)),
        UpdateOutcome::SkippedLockBusy
    );
    assert!(log.lock().unwrap().calls.is_empty(), "panel untouched");

    rival.unclaim();
    assert_eq!(mgr.render(&Frame::solid(2, 2, 0)), UpdateOutcome::Rendered);
    assert!(
        !backend.contains(&entry),
        "the session removed its entry on release"
    );
}

#[test]
fn a_session_waits_out_a_brief_holder() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("display.lock");

    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = barrier.clone();
    let holder_path = lock_path.clone();
    let holder = thread::spawn(move || {
        let mut lock = DisplayLock::new(holder_path);
        assert!(lock.acquire());
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(200));
        lock.release();
    });

    let mut config = DisplayConfig::default();
    config.lock.path = Some(lock_path);
    config.lock.timeout_secs = 10;
    config.lock.poll_interval_ms = 20;

    let panel = TestPanel::physical();
    let log = panel.log_handle();
    let mgr = DisplayManager::new(CollectingEmitter::default(), CollectingAudit::default(), config)
        .with_driver(Box::new(panel));

    barrier.wait();
    assert_eq!(mgr.render(&Frame::solid(2, 2, 0)), UpdateOutcome::Rendered);
    assert_eq!(log.lock().unwrap().calls, vec!["init", "render", "sleep"]);
    holder.join().unwrap();
}

#[test]
fn software_drivers_ignore_a_busy_lock_entirely() {
    let backend = MemoryBackend::new();
    let config = virtual_lock_config("/virtual/session.lock", 0);
    let entry = config.lock.resolved_path();

    let mut rival = backend.open_entry(&entry, "rival\n").unwrap();
    assert_eq!(rival.try_claim().unwrap(), Claim::Held);

    let mock = MockDisplay::with_size(4, 4);
    let preview = mock.frame_handle();
    let mgr = DisplayManager::new(CollectingEmitter::default(), CollectingAudit::default(), config)
        .with_driver(Box::new(mock))
        .with_lock_backend(Arc::new(backend.clone()));

    let frame = Frame::solid(4, 4, 0x33);
    assert_eq!(mgr.render(&frame), UpdateOutcome::Rendered);
    assert_eq!(preview.latest(), Some(frame));
    assert!(
        backend.contains(&entry),
        "the rival's entry was never touched"
    );
}
