#![forbid(unsafe_code)]
//! Halyard: serialized e-paper display sessions behind a cross-process lock.
//!
//! One panel, many writers: a scheduler, a web endpoint, and a shell script
//! may all decide to refresh the display at once. Halyard makes that safe:
//! - Every physical render runs as one session (init → render → sleep) while
//!   holding an exclusive file-based [`lock::DisplayLock`].
//! - Contention degrades gracefully: a busy lock means the update is skipped
//!   and reported as [`types::UpdateOutcome::SkippedLockBusy`], never a hang.
//! - Entries abandoned by crashed processes are swept once they are old
//!   enough and a claim probe shows no live holder behind them.
//!
//! Hardware stays behind the [`display::DisplayDriver`] trait; a software
//! panel ([`display::MockDisplay`]) renders into memory for development
//! hosts and web previews.

pub mod adapters;
pub mod config;
pub mod constants;
pub mod display;
pub mod lock;
pub mod logging;
pub mod manager;
pub mod types;

pub use config::{DisplayConfig, LockSettings, PanelConfig};
pub use display::{DisplayDriver, DriverError, DriverKind, Frame, MockDisplay, MockFrameHandle};
pub use lock::{default_lock_path, DisplayLock, ScopedLock};
pub use manager::DisplayManager;
pub use types::UpdateOutcome;
