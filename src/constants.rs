//! Shared crate-wide constants for Halyard.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Filename of the display lock entry when no explicit path is configured.
/// The default location is the system temp directory; see `lock::default_lock_path()`.
pub const DEFAULT_LOCK_FILE_NAME: &str = ".display.lock";

/// Poll interval in milliseconds between non-blocking claim attempts while
/// waiting for the display lock (see `lock.rs`).
pub const LOCK_POLL_MS: u64 = 100;

/// Default number of seconds `DisplayLock::acquire()` keeps retrying before
/// giving up, unless overridden by `LockSettings::timeout_secs`.
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 20;

/// Age in seconds beyond which an unclaimed lock entry is considered stale
/// and eligible for removal by `DisplayLock::sweep_stale()`.
pub const STALE_LOCK_SECS: u64 = 120;

/// Native panel width in pixels of the reference 7.3" e-paper module.
pub const DEFAULT_PANEL_WIDTH: u32 = 800;

/// Native panel height in pixels of the reference 7.3" e-paper module.
pub const DEFAULT_PANEL_HEIGHT: u32 = 480;
