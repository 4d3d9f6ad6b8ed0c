use log::Level;
use serde_json::Value;

/// Sink for structured facts describing display session milestones.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Sink for human-oriented audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// No-op sink for embedders that do not collect facts or audit lines.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Sink that forwards everything to the `log` crate.
///
/// Facts are written as one compact JSON object per line under the
/// `halyard::facts` target so they can be filtered apart from audit lines.
#[derive(Default)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::info!(target: "halyard::facts", "{} {} {} {}", subsystem, event, decision, fields);
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{}", msg);
    }
}
