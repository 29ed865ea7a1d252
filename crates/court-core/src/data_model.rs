//! Data Model: CaseInput, Verdict, Mode, UsageState
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VerdictError;

/// The two statements of a petty dispute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseInput {
    /// Plaintiff's statement, trimmed
    pub plaintiff_text: String,
    /// Defendant's statement, trimmed
    pub defendant_text: String,
}

impl CaseInput {
    /// Build an input; surrounding whitespace is dropped from both sides
    pub fn new(plaintiff_text: impl AsRef<str>, defendant_text: impl AsRef<str>) -> Self {
        Self {
            plaintiff_text: plaintiff_text.as_ref().trim().to_string(),
            defendant_text: defendant_text.as_ref().trim().to_string(),
        }
    }

    /// Both sides must present their case
    pub fn validate(&self) -> Result<(), VerdictError> {
        let plaintiff_missing = self.plaintiff_text.trim().is_empty();
        let defendant_missing = self.defendant_text.trim().is_empty();

        match (plaintiff_missing, defendant_missing) {
            (false, false) => Ok(()),
            (true, true) => Err(VerdictError::Validation(
                "plaintiff and defendant statements are empty".to_string(),
            )),
            (true, false) => Err(VerdictError::Validation(
                "plaintiff statement is empty".to_string(),
            )),
            (false, true) => Err(VerdictError::Validation(
                "defendant statement is empty".to_string(),
            )),
        }
    }
}

/// A side of the case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Plaintiff,
    Defendant,
}

impl Party {
    /// Parse a winner label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("plaintiff") {
            Some(Party::Plaintiff)
        } else if label.eq_ignore_ascii_case("defendant") {
            Some(Party::Defendant)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Plaintiff => "Plaintiff",
            Party::Defendant => "Defendant",
        }
    }

    /// The losing side when `self` wins
    pub fn opponent(&self) -> Self {
        match self {
            Party::Plaintiff => Party::Defendant,
            Party::Defendant => Party::Plaintiff,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured four-field judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Party,
    /// Punishment for the loser
    pub sentence: String,
    /// Roast targeting the loser
    pub roast: String,
    /// Two or three sentences of reasoning
    pub detailed_verdict: String,
}

impl Verdict {
    pub fn loser(&self) -> Party {
        self.winner.opponent()
    }
}

/// Persona/tone toggle; transient, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Standard,
    AlternatePersona,
}

impl Mode {
    pub fn toggle(self) -> Self {
        match self {
            Mode::Standard => Mode::AlternatePersona,
            Mode::AlternatePersona => Mode::Standard,
        }
    }

    /// Key of the persona entry this mode selects
    pub fn persona_key(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::AlternatePersona => "naija",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.persona_key())
    }
}

/// Verdict count for the current counting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    /// Verdicts issued since `last_reset`
    pub count: u32,
    /// Start of the current window
    pub last_reset: DateTime<Utc>,
}

impl UsageState {
    /// First-use state
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            last_reset: now,
        }
    }

    /// True once strictly more than `window` has passed since the last reset
    pub fn window_elapsed(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now - self.last_reset > window
    }

    /// Verdicts left before the limit is hit
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.count)
    }
}
