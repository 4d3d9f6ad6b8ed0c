//! Cross-process display lock.
//!
//! Exactly one process may drive the e-paper panel at a time: a refresh takes
//! tens of seconds and interleaved SPI command streams corrupt the image. The
//! lock is a file whose exclusive advisory claim marks the live holder.
//! Waiting is a non-blocking claim retried on a fixed poll interval under an
//! overall timeout, so a busy panel degrades to "skip this update" instead of
//! a hung caller.
//!
//! Entries left behind by a crashed process hold no claim (the kernel drops
//! advisory locks with the descriptor). They are swept once they are old
//! enough and a claim probe confirms nobody is alive behind them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::adapters::lock::{Claim, FileBackend, LockBackend, LockHandle};
use crate::constants::{
    DEFAULT_LOCK_FILE_NAME, DEFAULT_LOCK_TIMEOUT_SECS, LOCK_POLL_MS, STALE_LOCK_SECS,
};
use crate::logging::holder_stamp;

/// Default location of the lock entry: `.display.lock` under the system temp
/// directory, shared by every process on the host.
#[must_use]
pub fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOCK_FILE_NAME)
}

/// Exclusive, cross-process claim on the display.
///
/// Acquisition is boolean: `true` means this instance now holds the display,
/// `false` means it gave up (timeout or backend error) and the caller should
/// skip its update rather than fight for the panel. Acquiring while already
/// held is an immediate no-op, so nested call paths that each take the lock
/// stay safe within one instance.
pub struct DisplayLock {
    path: PathBuf,
    timeout: Duration,
    stale_after: Duration,
    poll_interval: Duration,
    backend: Arc<dyn LockBackend>,
    handle: Option<Box<dyn LockHandle>>,
    acquired: bool,
}

impl Default for DisplayLock {
    fn default() -> Self {
        Self::new(default_lock_path())
    }
}

impl DisplayLock {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
            stale_after: Duration::from_secs(STALE_LOCK_SECS),
            poll_interval: Duration::from_millis(LOCK_POLL_MS),
            backend: Arc::new(FileBackend::new()),
            handle: None,
            acquired: false,
        }
    }

    /// Overall wait budget for [`DisplayLock::acquire`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Age beyond which an unclaimed entry is considered abandoned.
    #[must_use]
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Delay between non-blocking claim attempts while waiting.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Swap the storage backend, e.g. for an in-memory one in tests.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn LockBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Path of the lock entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this instance currently holds the display.
    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Configured timeout used by [`DisplayLock::acquire`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire with the configured timeout.
    pub fn acquire(&mut self) -> bool {
        self.acquire_within(self.timeout)
    }

    /// Try to take the display for this process, waiting up to `timeout`.
    ///
    /// A stale leftover entry is swept first. The entry is then opened and
    /// stamped, and a non-blocking claim is retried every poll interval. At
    /// least one attempt is made even with a zero timeout. A holder releasing
    /// mid-wait unlinks the entry, orphaning the handle polled here; the loop
    /// reopens the live entry and keeps contending. On timeout the descriptor
    /// is closed but the entry file is left alone; another holder may still
    /// own it.
    pub fn acquire_within(&mut self, timeout: Duration) -> bool {
        if self.acquired {
            return true;
        }
        self.sweep_stale();
        let mut handle = match self.open_stamped() {
            Some(h) => h,
            None => return false,
        };
        let started = Instant::now();
        loop {
            match handle.try_claim() {
                Ok(Claim::Held) => {
                    debug!("display lock: acquired {}", self.path.display());
                    self.handle = Some(handle);
                    self.acquired = true;
                    return true;
                }
                Ok(Claim::Busy) => {
                    if started.elapsed() >= timeout {
                        warn!(
                            "display lock: gave up on {} after {:?}",
                            self.path.display(),
                            timeout
                        );
                        return false;
                    }
                    thread::sleep(self.poll_interval);
                }
                Ok(Claim::Orphaned) => {
                    if started.elapsed() >= timeout {
                        warn!(
                            "display lock: gave up on {} after {:?}",
                            self.path.display(),
                            timeout
                        );
                        return false;
                    }
                    // The polled entry was unlinked by a release. Contend
                    // for the live one right away; no poll sleep.
                    handle = match self.open_stamped() {
                        Some(h) => h,
                        None => return false,
                    };
                }
                Err(e) => {
                    warn!(
                        "display lock: claim on {} failed: {}",
                        self.path.display(),
                        e
                    );
                    return false;
                }
            }
        }
    }

    fn open_stamped(&self) -> Option<Box<dyn LockHandle>> {
        match self.backend.open_entry(&self.path, &holder_stamp()) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("display lock: cannot open {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Release the display and delete the lock entry.
    ///
    /// The entry is unlinked while the claim is still held, so an unclaimed
    /// entry never sits at the path waiting to be deleted; rivals polling
    /// through the release see busy, then orphaned, never a hold that is
    /// about to be unlinked. Deletion is best effort: a failure is logged,
    /// never raised. Releasing when not holding is a no-op, so double release
    /// is safe.
    pub fn release(&mut self) {
        if !self.acquired {
            return;
        }
        self.acquired = false;
        match self.backend.remove_entry(&self.path) {
            Ok(()) => debug!("display lock: released {}", self.path.display()),
            Err(e) => debug!(
                "display lock: leftover entry {}: {}",
                self.path.display(),
                e
            ),
        }
        if let Some(mut handle) = self.handle.take() {
            handle.unclaim();
        }
    }

    /// Remove the lock entry if it is stale: older than the configured
    /// threshold and not claimed by any live holder.
    ///
    /// Returns whether an entry was removed. Runs automatically at the start
    /// of every acquisition; callers only need it for explicit cleanup.
    pub fn sweep_stale(&self) -> bool {
        let age = match self.backend.entry_age(&self.path) {
            Some(age) => age,
            None => return false,
        };
        if age < self.stale_after {
            return false;
        }
        match self.backend.remove_if_unclaimed(&self.path) {
            Ok(true) => {
                warn!(
                    "display lock: removed stale entry {} (age {:?})",
                    self.path.display(),
                    age
                );
                true
            }
            Ok(false) => {
                debug!(
                    "display lock: old entry {} still has a live holder",
                    self.path.display()
                );
                false
            }
            Err(e) => {
                warn!(
                    "display lock: sweep of {} failed: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }

    /// Acquire for the duration of a scope.
    ///
    /// The guard releases on drop, panics included, but only if this call was
    /// the one that actually took the lock; a scope opened while the instance
    /// already holds leaves the outer hold intact. Check
    /// [`ScopedLock::acquired`] before touching the panel.
    pub fn scoped(&mut self) -> ScopedLock<'_> {
        let already_held = self.acquired;
        let acquired = self.acquire();
        ScopedLock {
            owns: acquired && !already_held,
            lock: self,
        }
    }

    /// Run `work` while holding the display; `None` means the lock was busy
    /// and the work was skipped.
    pub fn with_lock<T>(&mut self, work: impl FnOnce() -> T) -> Option<T> {
        let scope = self.scoped();
        if !scope.acquired() {
            return None;
        }
        Some(work())
    }
}

impl Drop for DisplayLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Guard returned by [`DisplayLock::scoped`].
pub struct ScopedLock<'a> {
    lock: &'a mut DisplayLock,
    owns: bool,
}

impl ScopedLock<'_> {
    /// Whether the display is held for this scope.
    #[must_use]
    pub fn acquired(&self) -> bool {
        self.lock.acquired
    }

    /// Path of the lock entry, for diagnostics.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.lock.path()
    }
}

impl Drop for ScopedLock<'_> {
    fn drop(&mut self) {
        if self.owns {
            self.lock.release();
        }
    }
}
