//! Application errors and the copy shown for them
use court_core::VerdictError;
use court_prompt::PromptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourtError {
    #[error(transparent)]
    Verdict(#[from] VerdictError),

    #[error("LIMIT/daily limit of {limit} verdicts reached")]
    LimitReached { limit: u32 },

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("PROMPT/{0}")]
    Prompt(String),

    #[error("IO/{0}")]
    Io(String),
}

impl From<PromptError> for CourtError {
    fn from(e: PromptError) -> Self {
        CourtError::Prompt(e.to_string())
    }
}

impl From<std::io::Error> for CourtError {
    fn from(e: std::io::Error) -> Self {
        CourtError::Io(e.to_string())
    }
}

impl CourtError {
    /// Message for the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            CourtError::Verdict(VerdictError::Validation(_)) => {
                "Both sides must present their case!".to_string()
            }
            CourtError::Verdict(VerdictError::Busy) => {
                "The court is already deliberating. Wait for the verdict.".to_string()
            }
            CourtError::Verdict(VerdictError::Network(detail))
            | CourtError::Verdict(VerdictError::MalformedResponse(detail)) => {
                format!("Judgment failed: {}", detail)
            }
            CourtError::Verdict(VerdictError::Timeout(ms)) => format!(
                "Judgment failed: the judge did not answer within {}s",
                ms / 1000
            ),
            CourtError::Verdict(VerdictError::Prompt(detail)) => {
                format!("Judgment failed: {}", detail)
            }
            CourtError::LimitReached { limit } => {
                format!("Court adjourned: all {} verdicts for today are used.", limit)
            }
            CourtError::Config(detail) => format!("Configuration error: {}", detail),
            CourtError::Prompt(detail) => format!("Persona error: {}", detail),
            CourtError::Io(detail) => format!("Terminal error: {}", detail),
        }
    }
}
