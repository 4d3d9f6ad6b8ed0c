//! Display driver seam.
//!
//! The manager drives any panel through [`DisplayDriver`]; hardware bindings
//! live in embedder crates. One logical session is init, then render, then
//! sleep: the panel draws serious current while awake, so it goes back to its
//! low-power state after every refresh.

pub mod mock;

pub use mock::{MockDisplay, MockFrameHandle};

use thiserror::Error;

/// What a driver actually talks to.
///
/// Software drivers render into memory and need no cross-process
/// coordination. Physical drivers share one panel per host, so every session
/// must hold the display lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverKind {
    Physical,
    Software,
}

impl DriverKind {
    /// Stable lowercase label used in facts payloads.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DriverKind::Physical => "physical",
            DriverKind::Software => "software",
        }
    }
}

/// Errors surfaced by display drivers.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver not initialized")]
    NotInitialized,
    #[error("driver is closed")]
    Closed,
    #[error("hardware error: {0}")]
    Hardware(String),
}

/// One frame of panel-ready pixel data.
///
/// The packing is whatever the target driver expects; this crate never
/// inspects the bytes. [`Frame::solid`] assumes one byte per pixel and exists
/// for tests and demos.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A `width` by `height` frame with every byte set to `value`.
    #[must_use]
    pub fn solid(width: u32, height: u32, value: u8) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![value; len],
        }
    }
}

/// A panel the manager can drive.
///
/// The manager calls `init` before each render, `sleep` after it, and `close`
/// once at teardown. Implementations should keep `init` idempotent; real
/// panels get re-initialized out of sleep on every session.
pub trait DisplayDriver: Send {
    /// Short name for logs and facts, e.g. `"epd7in3f"` or `"mock"`.
    fn name(&self) -> &'static str;

    fn kind(&self) -> DriverKind;

    /// Native panel size in pixels, width by height.
    fn size(&self) -> (u32, u32);

    /// Whether the driver is initialized and willing to render.
    fn is_ready(&self) -> bool;

    /// Bring the panel out of sleep and prepare it for a refresh.
    ///
    /// # Errors
    /// Returns an error when the panel cannot be reached or set up.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Push a frame to the panel. Blocks for the full refresh on real
    /// hardware, which can take tens of seconds.
    ///
    /// # Errors
    /// Returns an error when the frame cannot be displayed.
    fn render(&mut self, frame: &Frame) -> Result<(), DriverError>;

    /// Put the panel into its low-power state.
    ///
    /// # Errors
    /// Returns an error when the panel refuses the sleep command.
    fn sleep(&mut self) -> Result<(), DriverError>;

    /// Release the panel for good. Further calls may fail.
    ///
    /// # Errors
    /// Returns an error when teardown fails.
    fn close(&mut self) -> Result<(), DriverError>;
}
