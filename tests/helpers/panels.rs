use std::sync::{Arc, Mutex};

use halyard::display::{DisplayDriver, DriverError, DriverKind, Frame};

/// Which driver call is scripted to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Init,
    Render,
    Sleep,
    Close,
}

/// What a [`TestPanel`] saw, readable after the driver moved into a manager.
#[derive(Debug, Default)]
pub struct PanelLog {
    pub calls: Vec<&'static str>,
    pub frames: Vec<Frame>,
}

/// Scriptable driver for session tests. Physical by default, so sessions go
/// through the full lock protocol.
pub struct TestPanel {
    kind: DriverKind,
    fail_at: FailAt,
    ready: bool,
    log: Arc<Mutex<PanelLog>>,
}

impl TestPanel {
    pub fn physical() -> Self {
        Self {
            kind: DriverKind::Physical,
            fail_at: FailAt::Nothing,
            ready: false,
            log: Arc::default(),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn log_handle(&self) -> Arc<Mutex<PanelLog>> {
        Arc::clone(&self.log)
    }
}

impl DisplayDriver for TestPanel {
    fn name(&self) -> &'static str {
        "test-panel"
    }

    fn kind(&self) -> DriverKind {
        self.kind
    }

    fn size(&self) -> (u32, u32) {
        (800, 480)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn init(&mut self) -> Result<(), DriverError> {
        self.log.lock().unwrap().calls.push("init");
        if self.fail_at == FailAt::Init {
            return Err(DriverError::Hardware("init scripted to fail".to_string()));
        }
        self.ready = true;
        Ok(())
    }

    fn render(&mut self, frame: &Frame) -> Result<(), DriverError> {
        self.log.lock().unwrap().calls.push("render");
        if self.fail_at == FailAt::Render {
            return Err(DriverError::Hardware("render scripted to fail".to_string()));
        }
        self.log.lock().unwrap().frames.push(frame.clone());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.log.lock().unwrap().calls.push("sleep");
        if self.fail_at == FailAt::Sleep {
            return Err(DriverError::Hardware("sleep scripted to fail".to_string()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.log.lock().unwrap().calls.push("close");
        self.ready = false;
        if self.fail_at == FailAt::Close {
            return Err(DriverError::Hardware("close scripted to fail".to_string()));
        }
        Ok(())
    }
}
