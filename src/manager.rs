//! Display session orchestration.
//!
//! `DisplayManager` owns the driver and enforces the serialization story in
//! two layers: a process-local mutex so threads in this process queue up, and
//! the cross-process [`DisplayLock`] so other processes on the host stay out.
//! The lock spans the whole session (init, render, sleep), because a panel
//! woken by one process and slept by another ends up in an undefined state.
//!
//! Software drivers render into memory and skip the lock entirely.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::Level;
use serde_json::json;
use uuid::Uuid;

use crate::adapters::lock::{FileBackend, LockBackend};
use crate::config::DisplayConfig;
use crate::constants::{DEFAULT_PANEL_HEIGHT, DEFAULT_PANEL_WIDTH};
use crate::display::{DisplayDriver, DriverKind, Frame};
use crate::lock::DisplayLock;
use crate::logging::audit::SessionCtx;
use crate::logging::{now_iso, AuditSink, FactsEmitter, SessionLogger};
use crate::types::UpdateOutcome;

pub struct DisplayManager<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    config: DisplayConfig,
    driver: Mutex<Option<Box<dyn DisplayDriver>>>,
    lock_backend: Arc<dyn LockBackend>,
}

impl<E: FactsEmitter, A: AuditSink> DisplayManager<E, A> {
    pub fn new(facts: E, audit: A, config: DisplayConfig) -> Self {
        Self {
            facts,
            audit,
            config,
            driver: Mutex::new(None),
            lock_backend: Arc::new(FileBackend::new()),
        }
    }

    #[must_use]
    pub fn with_driver(mut self, driver: Box<dyn DisplayDriver>) -> Self {
        self.driver = Mutex::new(Some(driver));
        self
    }

    #[must_use]
    pub fn with_lock_backend(mut self, backend: Arc<dyn LockBackend>) -> Self {
        self.lock_backend = backend;
        self
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Replace the configuration for future sessions.
    ///
    /// Drivers are not swapped here; use [`DisplayManager::set_driver`] when
    /// a config change implies different hardware.
    pub fn update_config(&mut self, config: DisplayConfig) {
        self.config = config;
    }

    /// Whether a driver is attached and ready to render.
    pub fn display_available(&self) -> bool {
        self.gate().as_ref().map_or(false, |d| d.is_ready())
    }

    /// Effective panel size: config override first, then the driver's native
    /// size, then the reference panel geometry.
    pub fn panel_size(&self) -> (u32, u32) {
        let native = self.gate().as_ref().map(|d| d.size());
        let width = self
            .config
            .panel
            .width
            .or(native.map(|s| s.0))
            .unwrap_or(DEFAULT_PANEL_WIDTH);
        let height = self
            .config
            .panel
            .height
            .or(native.map(|s| s.1))
            .unwrap_or(DEFAULT_PANEL_HEIGHT);
        (width, height)
    }

    /// Swap the driver, closing the outgoing one.
    pub fn set_driver(&self, driver: Option<Box<dyn DisplayDriver>>) {
        let mut gate = self.gate();
        if let Some(mut old) = gate.take() {
            if let Err(e) = old.close() {
                self.audit
                    .log(Level::Warn, &format!("error closing outgoing driver: {}", e));
            }
        }
        *gate = driver;
    }

    /// Run one update session: init, render, sleep, all under the display
    /// lock for physical panels. Headless hosts skip without touching the
    /// lock.
    pub fn render(&self, frame: &Frame) -> UpdateOutcome {
        self.session(frame, false)
    }

    /// Like [`DisplayManager::render`] but updates even on a headless host.
    pub fn render_forced(&self, frame: &Frame) -> UpdateOutcome {
        self.session(frame, true)
    }

    /// Explicitly sweep a stale lock entry, e.g. from an operator endpoint.
    ///
    /// Emits a `lock.sweep` fact and returns whether an entry was removed.
    /// A live holder's entry is never removed, however old it looks.
    pub fn sweep_stale_lock(&self) -> bool {
        let lock = self.session_lock();
        let removed = lock.sweep_stale();
        let ctx = SessionCtx::new(
            &self.facts as &dyn FactsEmitter,
            Uuid::new_v4().to_string(),
            now_iso(),
        );
        SessionLogger::new(&ctx)
            .sweep()
            .field("path", json!(lock.path().display().to_string()))
            .field("removed", json!(removed))
            .emit_success();
        removed
    }

    /// Close and drop the driver. Errors are logged, not raised; closing an
    /// already-closed manager is a no-op.
    pub fn close(&self) {
        let mut gate = self.gate();
        if let Some(mut driver) = gate.take() {
            match driver.close() {
                Ok(()) => self.audit.log(Level::Debug, "display driver closed"),
                Err(e) => self
                    .audit
                    .log(Level::Error, &format!("error closing display driver: {}", e)),
            }
        }
    }

    fn gate(&self) -> MutexGuard<'_, Option<Box<dyn DisplayDriver>>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_lock(&self) -> DisplayLock {
        let settings = &self.config.lock;
        DisplayLock::new(settings.resolved_path())
            .with_timeout(settings.timeout())
            .with_stale_after(settings.stale_after())
            .with_poll_interval(settings.poll_interval())
            .with_backend(Arc::clone(&self.lock_backend))
    }

    fn session(&self, frame: &Frame, force: bool) -> UpdateOutcome {
        let ctx = SessionCtx::new(
            &self.facts as &dyn FactsEmitter,
            Uuid::new_v4().to_string(),
            now_iso(),
        );
        let slog = SessionLogger::new(&ctx);

        // Thread gate first: a session takes the driver exclusively.
        let mut gate = self.gate();
        let driver = match gate.as_mut() {
            Some(d) => d,
            None => {
                slog.attempt().driver("none", "none").emit_warn();
                self.audit
                    .log(Level::Info, "no display driver attached; skipping update");
                let outcome = UpdateOutcome::SkippedHeadless;
                self.finish(&slog, &outcome);
                return outcome;
            }
        };

        if driver.kind() == DriverKind::Software {
            // No shared hardware behind a software panel: no cross-process
            // lock, and the headless flag does not apply.
            slog.attempt()
                .driver(driver.name(), driver.kind().label())
                .lock("none", 0, 0)
                .emit_success();
            let outcome = drive(driver.as_mut(), frame);
            self.finish(&slog, &outcome);
            return outcome;
        }

        if self.config.headless && !force {
            slog.attempt()
                .driver(driver.name(), driver.kind().label())
                .field("headless", json!(true))
                .emit_warn();
            self.audit
                .log(Level::Info, "headless mode; skipping display update");
            let outcome = UpdateOutcome::SkippedHeadless;
            self.finish(&slog, &outcome);
            return outcome;
        }

        let mut lock = self.session_lock();
        let wait_started = Instant::now();
        let acquired = lock.acquire();
        let wait_ms = u64::try_from(wait_started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let attempts = 1 + wait_ms / self.config.lock.poll_interval_ms.max(1);

        let attempt = slog
            .attempt()
            .driver(driver.name(), driver.kind().label())
            .lock(self.lock_backend.name(), wait_ms, attempts);
        if !acquired {
            attempt.field("error_id", json!("E_LOCKING")).emit_failure();
            self.audit
                .log(Level::Warn, "display lock busy; skipping update");
            let outcome = UpdateOutcome::SkippedLockBusy;
            self.finish(&slog, &outcome);
            return outcome;
        }
        attempt.emit_success();

        let outcome = drive(driver.as_mut(), frame);
        lock.release();
        self.finish(&slog, &outcome);
        outcome
    }

    fn finish(&self, slog: &SessionLogger<'_>, outcome: &UpdateOutcome) {
        let builder = slog.result().field("outcome", json!(outcome.label()));
        match outcome {
            UpdateOutcome::Rendered => builder.emit_success(),
            UpdateOutcome::SkippedHeadless | UpdateOutcome::SkippedLockBusy => builder.emit_warn(),
            UpdateOutcome::DriverFailed(msg) => {
                self.audit
                    .log(Level::Error, &format!("display update failed: {}", msg));
                builder.field("error", json!(msg)).emit_failure();
            }
        }
    }
}

impl<E: FactsEmitter, A: AuditSink> Drop for DisplayManager<E, A> {
    fn drop(&mut self) {
        self.close();
    }
}

fn drive(driver: &mut dyn DisplayDriver, frame: &Frame) -> UpdateOutcome {
    if let Err(e) = driver.init() {
        return UpdateOutcome::DriverFailed(format!("init: {}", e));
    }
    if let Err(e) = driver.render(frame) {
        return UpdateOutcome::DriverFailed(format!("render: {}", e));
    }
    // A render failure skips the sleep: the driver state is unknown and the
    // next session re-initializes anyway.
    if let Err(e) = driver.sleep() {
        return UpdateOutcome::DriverFailed(format!("sleep: {}", e));
    }
    UpdateOutcome::Rendered
}
