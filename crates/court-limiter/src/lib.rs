//! Court Limiter: daily verdict quota
//!
//! Tracks how many verdicts were issued in the current 24-hour window and
//! decides whether another one is allowed.
//!
//! # Flow
//!
//! ```text
//! check_and_maybe_reset(now) → can_issue(state) ─ yes → (verdict) → record_issuance(state)
//!                                     │
//!                                     └─ no → unlock offer → unlock(state)
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use court_limiter::{MemoryStore, UsageLimiter};
//!
//! let limiter = UsageLimiter::new(MemoryStore::new());
//! let state = limiter.check_and_maybe_reset(Utc::now());
//! assert!(limiter.can_issue(&state));
//!
//! let state = limiter.record_issuance(state);
//! assert_eq!(state.count, 1);
//! ```

pub mod clock;
pub mod limiter;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{UsageLimiter, DEFAULT_WINDOW_HOURS};
pub use storage::{FileStore, MemoryStore, UsageStore};
