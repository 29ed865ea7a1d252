//! Court: the limiter and the verdict session under one roof
//!
//! ```text
//! judge(input)
//!   ├─ validate ───────────────────────────── ValidationError (no call)
//!   ├─ check_and_maybe_reset → can_issue? ─── no → LimitReached (offer unlock)
//!   ├─ VerdictSession::request_verdict ────── error → surfaced, count unchanged
//!   └─ record_issuance (exactly once) ─────── Judgment
//! ```

use court_core::{CaseInput, Mode, UsageState, Verdict};
use court_limiter::{Clock, UsageLimiter, UsageStore};
use court_prompt::PromptRenderer;
use court_session::{GenerativeClient, VerdictSession};
use rand::Rng;

use crate::error::CourtError;
use crate::unlock::{ShareInvite, UnlockOffer, UnlockOutcome};

/// A delivered verdict
#[derive(Debug, Clone)]
pub struct Judgment {
    pub verdict: Verdict,
    pub case_number: u32,
    /// Verdicts left in the current window
    pub remaining: u32,
}

/// Result of an unlock
#[derive(Debug, Clone, Copy)]
pub struct UnlockReceipt {
    pub outcome: UnlockOutcome,
    pub state: UsageState,
}

pub struct Court<G, S, C> {
    limiter: UsageLimiter<S>,
    session: VerdictSession<G>,
    clock: C,
    offer: UnlockOffer,
    share_url: String,
    mode: Mode,
}

impl<G, S, C> Court<G, S, C>
where
    G: GenerativeClient,
    S: UsageStore,
    C: Clock,
{
    pub fn new(
        limiter: UsageLimiter<S>,
        session: VerdictSession<G>,
        clock: C,
        offer: UnlockOffer,
        share_url: impl Into<String>,
    ) -> Self {
        Self {
            limiter,
            session,
            clock,
            offer,
            share_url: share_url.into(),
            mode: Mode::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggle();
        tracing::debug!(mode = %self.mode, "mode toggled");
        self.mode
    }

    pub fn limit(&self) -> u32 {
        self.limiter.limit()
    }

    pub fn renderer(&self) -> &PromptRenderer {
        self.session.renderer()
    }

    /// Current usage, reset first if the window has elapsed
    pub fn usage(&self) -> UsageState {
        self.limiter.check_and_maybe_reset(self.clock.now())
    }

    pub fn remaining(&self) -> u32 {
        self.limiter.remaining(&self.usage())
    }

    pub fn can_issue(&self) -> bool {
        self.limiter.can_issue(&self.usage())
    }

    /// One full verdict attempt
    pub async fn judge(&self, input: &CaseInput) -> Result<Judgment, CourtError> {
        input.validate()?;

        let state = self.usage();
        if !self.limiter.can_issue(&state) {
            tracing::info!(count = state.count, "daily limit reached");
            return Err(CourtError::LimitReached {
                limit: self.limiter.limit(),
            });
        }

        let result = self.session.request_verdict(input, self.mode).await;
        self.session.acknowledge();
        let verdict = result?;

        // Fresh read: the window may have rolled over during the call
        let state = self.limiter.record_issuance(self.usage());
        Ok(Judgment {
            verdict,
            case_number: rand::rng().random_range(1000..=9999),
            remaining: self.limiter.remaining(&state),
        })
    }

    /// What the unlock offer shares, in the current mode's voice
    pub fn invite(&self) -> Result<ShareInvite, CourtError> {
        let copy = self.renderer().copy(self.mode)?;
        Ok(ShareInvite {
            text: copy.share_text.clone(),
            url: self.share_url.clone(),
        })
    }

    /// Run the share/clipboard nudge, then unlock no matter what happened
    pub fn unlock(&self) -> UnlockReceipt {
        let outcome = match self.invite() {
            Ok(invite) => self.offer.run(&invite),
            Err(e) => {
                tracing::warn!("could not build share invite: {}", e);
                UnlockOutcome::Unconfirmed
            }
        };
        let state = self.limiter.unlock(self.usage());
        UnlockReceipt { outcome, state }
    }

    /// Decree for a delivered judgment in the current mode
    pub fn render_card(&self, judgment: &Judgment) -> Result<String, CourtError> {
        Ok(self
            .renderer()
            .render_card(&judgment.verdict, self.mode, judgment.case_number)?)
    }
}
