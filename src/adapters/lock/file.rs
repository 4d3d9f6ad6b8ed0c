use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;

use crate::types::errors::{Error, Result};

use super::{Claim, LockBackend, LockHandle};

/// Lock entries as real files, claims as OS advisory locks via `fs2`.
///
/// Claims live on the open file description, so they vanish with the process
/// and can never outlive a crash. Two handles within one process still
/// contend, which is what makes the thread-based tests below meaningful.
#[derive(Debug, Default)]
pub struct FileBackend;

impl FileBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn would_block(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Whether `file` is still the entry at `path`, by device and inode.
///
/// A releasing holder unlinks the path, so a descriptor opened earlier can
/// outlive the entry it named. Claims on such an unlinked inode exclude
/// nobody: a rival that re-creates the path locks a different inode.
fn entry_is_current(file: &File, path: &Path) -> Result<bool> {
    let held = file
        .metadata()
        .map_err(|e| Error::io(format!("stat held entry: {}", e)))?;
    match fs::metadata(path) {
        Ok(on_disk) => Ok(on_disk.dev() == held.dev() && on_disk.ino() == held.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(format!("stat {}: {}", path.display(), e))),
    }
}

struct FileHandle {
    file: File,
    path: PathBuf,
    claimed: bool,
}

impl LockHandle for FileHandle {
    fn try_claim(&mut self) -> Result<Claim> {
        if self.claimed {
            return Ok(Claim::Held);
        }
        match self.file.try_lock_exclusive() {
            Ok(()) => {
                if entry_is_current(&self.file, &self.path)? {
                    self.claimed = true;
                    Ok(Claim::Held)
                } else {
                    let _ = self.file.unlock();
                    Ok(Claim::Orphaned)
                }
            }
            Err(e) if would_block(&e) => Ok(Claim::Busy),
            Err(e) => Err(Error::io(format!("claim lock entry: {}", e))),
        }
    }

    fn unclaim(&mut self) {
        if self.claimed {
            let _ = self.file.unlock();
            self.claimed = false;
        }
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        self.unclaim();
    }
}

impl LockBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn entry_age(&self, path: &Path) -> Option<Duration> {
        let modified = fs::metadata(path).ok()?.modified().ok()?;
        // An mtime in the future (clock stepped back) reads as a fresh entry.
        Some(modified.elapsed().unwrap_or(Duration::ZERO))
    }

    fn remove_if_unclaimed(&self, path: &Path) -> Result<bool> {
        // Probe with a non-blocking claim first: age alone does not prove the
        // holder is gone, and deleting a claimed entry would let two sessions
        // drive the panel at once.
        let file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(Error::io(format!("open {}: {}", path.display(), e)));
            }
        };
        match file.try_lock_exclusive() {
            Ok(()) => {
                // The entry can have been released and re-created between the
                // open and the claim; unlinking the path then would remove a
                // rival's fresh entry, not the stale one probed here.
                if !entry_is_current(&file, path)? {
                    let _ = file.unlock();
                    return Ok(false);
                }
                let removed = fs::remove_file(path);
                let _ = file.unlock();
                match removed {
                    Ok(()) => Ok(true),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                    Err(e) => Err(Error::io(format!("remove {}: {}", path.display(), e))),
                }
            }
            Err(e) if would_block(&e) => Ok(false),
            Err(e) => Err(Error::io(format!("probe {}: {}", path.display(), e))),
        }
    }

    fn remove_entry(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("remove {}: {}", path.display(), e))),
        }
    }

    fn open_entry(&self, path: &Path, stamp: &str) -> Result<Box<dyn LockHandle>> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io(format!("open {}: {}", path.display(), e)))?;
        file.write_all(stamp.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::io(format!("stamp {}: {}", path.display(), e)))?;
        Ok(Box::new(FileHandle {
            file,
            path: path.to_path_buf(),
            claimed: false,
        }))
    }
}
