pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::path::Path;
use std::time::Duration;

use crate::types::errors::Result;

/// Outcome of one non-blocking claim attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    /// This handle now holds the exclusive claim on the live entry.
    Held,
    /// Another holder has the claim right now.
    Busy,
    /// The entry this handle opened was removed or replaced at its path.
    /// A claim on it guards nothing; reopen to contend for the live entry.
    Orphaned,
}

/// One open lock entry, ready to be claimed.
///
/// A handle owns whatever the backend uses to hold a claim (an open file
/// descriptor for the file backend). Dropping a handle releases any claim it
/// still holds, the same way the kernel drops an advisory lock when the last
/// descriptor closes.
pub trait LockHandle: Send {
    /// Try to take the exclusive claim on this entry without blocking.
    ///
    /// `Held` is only reported when the entry behind this handle is still the
    /// one at its path. A handle whose entry was unlinked out from under it
    /// (a racing release, say) answers `Orphaned` instead, because winning
    /// that claim would not exclude a rival holding a fresh entry. Already
    /// holding the claim is `Held`.
    ///
    /// # Errors
    /// Returns an error for claim failures other than contention.
    fn try_claim(&mut self) -> Result<Claim>;

    /// Give the claim back, if this handle holds it. Idempotent.
    fn unclaim(&mut self);
}

/// Storage for display lock entries keyed by path.
///
/// `DisplayLock` drives the retry and staleness protocol; backends only
/// answer primitive questions about entries. The file backend is the real
/// one. The in-memory backend exists for tests that script contention and
/// stale entries without touching a filesystem or sleeping for minutes.
pub trait LockBackend: Send + Sync {
    /// Short label for facts payloads, e.g. `"file"` or `"memory"`.
    fn name(&self) -> &'static str;

    /// Age of the entry at `path`, or `None` when there is no entry.
    fn entry_age(&self, path: &Path) -> Option<Duration>;

    /// Remove the entry at `path` only if nobody holds its claim.
    ///
    /// Returns whether the entry was removed. `Ok(false)` covers both a
    /// missing entry and a live holder.
    ///
    /// # Errors
    /// Returns an error when the entry cannot be probed or removed.
    fn remove_if_unclaimed(&self, path: &Path) -> Result<bool>;

    /// Remove the entry at `path` unconditionally. A missing entry is not an
    /// error.
    ///
    /// # Errors
    /// Returns an error when the entry exists but cannot be removed.
    fn remove_entry(&self, path: &Path) -> Result<()>;

    /// Create or refresh the entry at `path`, writing the holder stamp into
    /// it, and return a handle that can claim it.
    ///
    /// Refreshing resets the entry age. The stamp is diagnostic only and may
    /// overwrite a live holder's stamp; claims are unaffected.
    ///
    /// # Errors
    /// Returns an error when the entry cannot be created or written.
    fn open_entry(&self, path: &Path, stamp: &str) -> Result<Box<dyn LockHandle>>;
}
