//! Court Session: one verdict request/response cycle at a time
//!
//! ```text
//! CaseInput ─ validate ─ render prompt ─ GenerativeClient ─ parse_verdict ─ Verdict
//!                                          (timeout)
//! ```
//!
//! The session never touches usage state; the caller records a successful
//! verdict with the limiter.

pub mod client;
pub mod gemini;
pub mod parse;
pub mod session;

pub use client::{ClientError, GenerationRequest, GenerativeClient};
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use parse::parse_verdict;
pub use session::{SessionState, VerdictSession, DEFAULT_TIMEOUT};
