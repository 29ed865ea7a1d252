//! Request Context: per-cycle identity carried through logs
use crate::data_model::Mode;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(mode: Mode) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            mode,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the cycle started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}
