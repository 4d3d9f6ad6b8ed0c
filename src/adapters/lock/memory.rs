use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::types::errors::Result;

use super::{Claim, LockBackend, LockHandle};

#[derive(Debug)]
struct Entry {
    // Identity of the underlying "inode". Claims attach to an epoch, so a
    // handle left over from a removed entry cannot disturb its replacement.
    epoch: u64,
    claimed: bool,
    opened: Instant,
    backdated: Duration,
    stamp: String,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<PathBuf, Entry>,
    next_epoch: u64,
}

/// In-memory lock store for tests.
///
/// Mirrors the file backend closely enough to script every branch of the
/// acquisition protocol: claims contend across handles, entries age, and
/// [`MemoryBackend::backdate`] fakes an old entry without sleeping for two
/// minutes. Clones share the same store.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the entry at `path` appear `by` older than it really is.
    pub fn backdate(&self, path: &Path, by: Duration) {
        if let Some(entry) = self.state().entries.get_mut(path) {
            entry.backdated += by;
        }
    }

    /// Whether an entry currently exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.state().entries.contains_key(path)
    }

    /// The stamp most recently written into the entry at `path`.
    #[must_use]
    pub fn stamp(&self, path: &Path) -> Option<String> {
        self.state().entries.get(path).map(|e| e.stamp.clone())
    }
}

struct MemoryHandle {
    state: Arc<Mutex<State>>,
    path: PathBuf,
    epoch: u64,
    claimed: bool,
}

impl MemoryHandle {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LockHandle for MemoryHandle {
    fn try_claim(&mut self) -> Result<Claim> {
        if self.claimed {
            return Ok(Claim::Held);
        }
        let mut state = self.state();
        match state.entries.get_mut(&self.path) {
            Some(entry) if entry.epoch == self.epoch => {
                if entry.claimed {
                    Ok(Claim::Busy)
                } else {
                    entry.claimed = true;
                    drop(state);
                    self.claimed = true;
                    Ok(Claim::Held)
                }
            }
            // The entry was removed or replaced after this handle opened it.
            // A claim on it would guard nothing.
            _ => Ok(Claim::Orphaned),
        }
    }

    fn unclaim(&mut self) {
        if !self.claimed {
            return;
        }
        self.claimed = false;
        let mut state = self.state();
        if let Some(entry) = state.entries.get_mut(&self.path) {
            if entry.epoch == self.epoch {
                entry.claimed = false;
            }
        }
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.unclaim();
    }
}

impl LockBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn entry_age(&self, path: &Path) -> Option<Duration> {
        self.state()
            .entries
            .get(path)
            .map(|e| e.opened.elapsed() + e.backdated)
    }

    fn remove_if_unclaimed(&self, path: &Path) -> Result<bool> {
        let mut state = self.state();
        match state.entries.get(path) {
            Some(entry) if entry.claimed => Ok(false),
            Some(_) => {
                state.entries.remove(path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_entry(&self, path: &Path) -> Result<()> {
        self.state().entries.remove(path);
        Ok(())
    }

    fn open_entry(&self, path: &Path, stamp: &str) -> Result<Box<dyn LockHandle>> {
        let mut state = self.state();
        let epoch = match state.entries.get_mut(path) {
            Some(entry) => {
                // Refreshing is the mtime reset of a truncating open.
                entry.opened = Instant::now();
                entry.backdated = Duration::ZERO;
                entry.stamp = stamp.to_string();
                entry.epoch
            }
            None => {
                state.next_epoch += 1;
                let epoch = state.next_epoch;
                state.entries.insert(
                    path.to_path_buf(),
                    Entry {
                        epoch,
                        claimed: false,
                        opened: Instant::now(),
                        backdated: Duration::ZERO,
                        stamp: stamp.to_string(),
                    },
                );
                epoch
            }
        };
        drop(state);
        Ok(Box::new(MemoryHandle {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            epoch,
            claimed: false,
        }))
    }
}
