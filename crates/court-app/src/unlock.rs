//! UnlockOffer: the share-or-copy nudge shown when the court is adjourned
//!
//! Actions are tried in order; the first that succeeds decides the outcome.
//! A failing (or panicking) action never fails the offer, and the caller
//! unlocks whatever the outcome.

use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

/// What gets shared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareInvite {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("{action} failed: {reason}")]
    Failed { action: &'static str, reason: String },
}

/// How the unlock came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Shared,
    Copied,
    /// Every action failed; the court is unlocked anyway
    Unconfirmed,
}

impl UnlockOutcome {
    pub fn notice(&self) -> &'static str {
        match self {
            UnlockOutcome::Copied => "Link copied! Court unlocked.",
            UnlockOutcome::Shared | UnlockOutcome::Unconfirmed => "Court unlocked!",
        }
    }
}

/// One best-effort step of the offer
pub trait UnlockAction: Send + Sync {
    fn name(&self) -> &'static str;

    /// Outcome reported when this action succeeds
    fn outcome(&self) -> UnlockOutcome;

    fn attempt(&self, invite: &ShareInvite) -> Result<(), ActionError>;
}

/// Opens a share-intent page in the default browser
pub struct ShareAction {
    intent_base: String,
}

impl ShareAction {
    pub fn new() -> Self {
        Self::with_intent_base("https://twitter.com/intent/tweet")
    }

    pub fn with_intent_base(intent_base: impl Into<String>) -> Self {
        Self {
            intent_base: intent_base.into(),
        }
    }

    pub fn intent_url(&self, invite: &ShareInvite) -> String {
        format!(
            "{}?text={}&url={}",
            self.intent_base,
            urlencoding::encode(&invite.text),
            urlencoding::encode(&invite.url)
        )
    }
}

impl Default for ShareAction {
    fn default() -> Self {
        Self::new()
    }
}

impl UnlockAction for ShareAction {
    fn name(&self) -> &'static str {
        "share"
    }

    fn outcome(&self) -> UnlockOutcome {
        UnlockOutcome::Shared
    }

    fn attempt(&self, invite: &ShareInvite) -> Result<(), ActionError> {
        webbrowser::open(&self.intent_url(invite)).map_err(|e| ActionError::Failed {
            action: "share",
            reason: e.to_string(),
        })
    }
}

/// Copies the share link to the system clipboard
#[derive(Debug, Default)]
pub struct ClipboardAction;

impl UnlockAction for ClipboardAction {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn outcome(&self) -> UnlockOutcome {
        UnlockOutcome::Copied
    }

    fn attempt(&self, invite: &ShareInvite) -> Result<(), ActionError> {
        let failed = |e: arboard::Error| ActionError::Failed {
            action: "clipboard",
            reason: e.to_string(),
        };
        let mut clipboard = arboard::Clipboard::new().map_err(failed)?;
        clipboard.set_text(invite.url.clone()).map_err(failed)
    }
}

/// Ordered list of best-effort unlock actions
pub struct UnlockOffer {
    actions: Vec<Box<dyn UnlockAction>>,
}

impl UnlockOffer {
    pub fn new(actions: Vec<Box<dyn UnlockAction>>) -> Self {
        Self { actions }
    }

    /// Share first, clipboard as fallback
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ShareAction::new()),
            Box::new(ClipboardAction),
        ])
    }

    /// Offer with nothing to try
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    /// Try each action in turn. Never fails.
    pub fn run(&self, invite: &ShareInvite) -> UnlockOutcome {
        for action in &self.actions {
            let attempt = catch_unwind(AssertUnwindSafe(|| action.attempt(invite)));
            match attempt {
                Ok(Ok(())) => {
                    tracing::info!(action = action.name(), "unlock action succeeded");
                    return action.outcome();
                }
                Ok(Err(e)) => tracing::warn!(action = action.name(), "unlock action failed: {}", e),
                Err(_) => tracing::warn!(action = action.name(), "unlock action panicked"),
            }
        }
        UnlockOutcome::Unconfirmed
    }
}
