//! Watch two processes' worth of lock traffic on one entry.
//!
//! Run with `cargo run --example 03_contended_lock`.

use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use halyard::DisplayLock;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let entry = dir.path().join("display.lock");

    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = barrier.clone();
    let holder_entry = entry.clone();
    let holder = thread::spawn(move || {
        let mut lock = DisplayLock::new(holder_entry);
        assert!(lock.acquire());
        println!("[holder] acquired, refreshing the panel for 2s...");
        holder_barrier.wait();
        thread::sleep(Duration::from_secs(2));
        lock.release();
        println!("[holder] released");
    });

    barrier.wait();
    if let Ok(stamp) = fs::read_to_string(&entry) {
        print!("[rival ] entry says: {}", stamp);
    }

    // First try: a short budget loses against a 2s holder.
    let mut rival = DisplayLock::new(entry.clone()).with_timeout(Duration::from_millis(500));
    let started = Instant::now();
    if !rival.acquire() {
        println!(
            "[rival ] busy after {:?}; skipping this update",
            started.elapsed()
        );
    }

    // Second try: a patient budget wins once the holder releases.
    let started = Instant::now();
    if rival.acquire_within(Duration::from_secs(5)) {
        println!("[rival ] acquired after {:?}", started.elapsed());
        rival.release();
    }
    holder.join().map_err(|_| "holder thread panicked")?;

    // Leftover entries from crashed processes get swept once they are old
    // enough; a zero threshold shows the mechanics without the two-minute wait.
    fs::write(&entry, "Lock acquired by PID 99999 at 2020-01-01T00:00:00Z\n")?;
    let sweeper = DisplayLock::new(entry.clone()).with_stale_after(Duration::ZERO);
    println!("[sweep ] removed orphan: {}", sweeper.sweep_stale());
    println!("[sweep ] entry still present: {}", entry.exists());
    Ok(())
}
