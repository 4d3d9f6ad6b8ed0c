pub mod audit;
pub mod facts;
pub mod stamp;

pub use audit::{Decision, EventBuilder, SessionLogger, Stage};
pub use facts::{AuditSink, FactsEmitter, JsonlSink, LogSink};
pub use stamp::{holder_stamp, now_iso, TS_ZERO};
