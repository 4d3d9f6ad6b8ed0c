use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::constants::{DEFAULT_PANEL_HEIGHT, DEFAULT_PANEL_WIDTH};

use super::{DisplayDriver, DriverError, DriverKind, Frame};

/// Software panel that keeps the most recent frame in memory.
///
/// Stands in for real hardware on development machines and lets a web layer
/// serve a live preview of what the panel would show. Handles cloned off via
/// [`MockDisplay::frame_handle`] stay valid after the driver moves into the
/// manager.
pub struct MockDisplay {
    size: (u32, u32),
    ready: bool,
    latest: Arc<Mutex<Option<Frame>>>,
}

impl MockDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT)
    }

    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ready: true,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle onto the latest frame, usable after the driver is boxed away.
    #[must_use]
    pub fn frame_handle(&self) -> MockFrameHandle {
        MockFrameHandle {
            latest: Arc::clone(&self.latest),
        }
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDriver for MockDisplay {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn kind(&self) -> DriverKind {
        DriverKind::Software
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn init(&mut self) -> Result<(), DriverError> {
        self.ready = true;
        Ok(())
    }

    fn render(&mut self, frame: &Frame) -> Result<(), DriverError> {
        if !self.ready {
            return Err(DriverError::Closed);
        }
        debug!(
            "mock display: rendering {}x{} frame",
            frame.width, frame.height
        );
        *lock(&self.latest) = Some(frame.clone());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        debug!("mock display: sleep");
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.ready = false;
        Ok(())
    }
}

fn lock(latest: &Arc<Mutex<Option<Frame>>>) -> MutexGuard<'_, Option<Frame>> {
    latest.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read side of a [`MockDisplay`], e.g. for a web preview endpoint.
#[derive(Clone)]
pub struct MockFrameHandle {
    latest: Arc<Mutex<Option<Frame>>>,
}

impl MockFrameHandle {
    /// The last frame rendered, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Frame> {
        lock(&self.latest).clone()
    }
}
