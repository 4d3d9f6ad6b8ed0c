use log::Level;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use halyard::logging::{AuditSink, FactsEmitter};

/// In-memory facts collector for asserting on session events.
#[derive(Clone, Default, Debug)]
pub struct CollectingEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl CollectingEmitter {
    /// Field payloads of every fact with the given event name.
    pub fn named(&self, event: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _, _)| e == event)
            .map(|(_, _, _, fields)| fields.clone())
            .collect()
    }
}

impl FactsEmitter for CollectingEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events.lock().unwrap().push((
            subsystem.to_string(),
            event.to_string(),
            decision.to_string(),
            fields,
        ));
    }
}

/// In-memory audit line collector.
#[derive(Clone, Default)]
pub struct CollectingAudit {
    pub lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl AuditSink for CollectingAudit {
    fn log(&self, level: Level, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}
