//! Typed configuration slice for display behavior.
//!
//! The host application owns its own config file; this crate reads only the
//! display-related corner of it. Every field has a default, so deserializing
//! `{}` or any partial object yields a working configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOCK_TIMEOUT_SECS, LOCK_POLL_MS, STALE_LOCK_SECS};
use crate::lock::default_lock_path;

/// Display-facing configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// No physical panel on this host; sessions skip rendering unless forced.
    pub headless: bool,
    pub panel: PanelConfig,
    pub lock: LockSettings,
}

impl DisplayConfig {
    /// Configuration for a host without a panel attached.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }
}

/// Panel geometry overrides. `None` defers to the driver's native size.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Tunables for the cross-process display lock.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LockSettings {
    /// Lock entry location. `None` means `.display.lock` in the system temp
    /// directory.
    pub path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub stale_after_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            stale_after_secs: STALE_LOCK_SECS,
            poll_interval_ms: LOCK_POLL_MS,
        }
    }
}

impl LockSettings {
    /// Concrete lock entry path after applying the default.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_lock_path)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
