// Audit helpers that emit structured facts across display session stages.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for `session.attempt`,
//   `session.result`, and `lock.sweep`.
// - Ensures a minimal envelope is present on every fact: `schema_version`,
//   `ts`, `session_id`.
use crate::logging::FactsEmitter;
use serde_json::{json, Value};

pub(crate) const SCHEMA_VERSION: i64 = 1;

pub(crate) struct SessionCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub session_id: String,
    pub ts: String,
}

impl<'a> SessionCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, session_id: String, ts: String) -> Self {
        Self {
            facts,
            session_id,
            ts,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    SessionAttempt,
    SessionResult,
    LockSweep,
}

impl Stage {
    fn as_event(&self) -> &'static str {
        match self {
            Stage::SessionAttempt => "session.attempt",
            Stage::SessionResult => "session.result",
            Stage::LockSweep => "lock.sweep",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(&self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with a centralized envelope.
pub struct SessionLogger<'a> {
    ctx: &'a SessionCtx<'a>,
}

impl<'a> SessionLogger<'a> {
    pub(crate) fn new(ctx: &'a SessionCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn attempt(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::SessionAttempt)
    }
    pub fn result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::SessionResult)
    }
    pub fn sweep(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::LockSweep)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a SessionCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a SessionCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    /// Record which driver the session is addressing.
    pub fn driver(mut self, name: &str, kind: &str) -> Self {
        self.fields.insert("driver".into(), json!(name));
        self.fields.insert("driver_kind".into(), json!(kind));
        self
    }

    /// Record lock telemetry for the session.
    pub fn lock(mut self, backend: &str, wait_ms: u64, attempts: u64) -> Self {
        self.fields.insert("lock_backend".into(), json!(backend));
        self.fields.insert("lock_wait_ms".into(), json!(wait_ms));
        self.fields.insert("lock_attempts".into(), json!(attempts));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn merge(mut self, extra: Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj.iter() {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        emit_with_envelope(
            self.ctx,
            self.stage.as_event(),
            decision.as_str(),
            fields,
        );
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success)
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure)
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn)
    }
}

fn emit_with_envelope(ctx: &SessionCtx, event: &str, decision: &str, mut fields: Value) {
    if let Some(obj) = fields.as_object_mut() {
        obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        obj.entry("ts").or_insert(json!(ctx.ts));
        obj.entry("session_id").or_insert(json!(ctx.session_id));
    }
    ctx.facts.emit("halyard", event, decision, fields);
}
