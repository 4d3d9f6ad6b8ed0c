//! Outcome vocabulary for display update sessions.

/// Result of one display update session.
///
/// A session that never reaches the panel is not automatically an error:
/// headless hosts and busy locks are expected states, and callers decide how
/// to surface them. Only `DriverFailed` indicates something actually broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The frame reached the driver and the panel was put back to sleep.
    Rendered,
    /// Headless host and the update was not forced; the panel was left alone.
    SkippedHeadless,
    /// Another holder kept the display lock for the whole timeout window.
    SkippedLockBusy,
    /// The driver reported an error before the session completed.
    DriverFailed(String),
}

impl UpdateOutcome {
    /// True when pixels actually changed on the panel.
    #[must_use]
    pub fn rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }

    /// True for the skip variants, where doing nothing was the correct move.
    #[must_use]
    pub fn skipped(&self) -> bool {
        matches!(self, Self::SkippedHeadless | Self::SkippedLockBusy)
    }

    /// Stable lowercase label used in facts payloads and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::SkippedHeadless => "skipped_headless",
            Self::SkippedLockBusy => "skipped_lock_busy",
            Self::DriverFailed(_) => "driver_failed",
        }
    }
}
