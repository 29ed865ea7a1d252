//! Court Core: data model, errors and request context
//!
//! Shared vocabulary for the usage limiter, the verdict session and the app.

pub mod context;
pub mod data_model;
pub mod error;

pub use context::RequestContext;
pub use data_model::{CaseInput, Mode, Party, UsageState, Verdict};
pub use error::{StorageError, VerdictError};

/// Engine version reported in logs
pub const COURT_VERSION: &str = "1.0.0";

/// Verdicts allowed per 24-hour window before the court adjourns
pub const DAILY_LIMIT: u32 = 3;

/// Storage key holding the current-window verdict count
pub const STORAGE_KEY_COUNT: &str = "petty_court_count";

/// Storage key holding the window start, in epoch milliseconds
pub const STORAGE_KEY_LAST_RESET: &str = "petty_court_last_reset";
