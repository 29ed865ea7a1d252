//! VerdictSession: the single-flight request state machine
//!
//! ```text
//! Idle ─ request_verdict ─→ InFlight ─┬─→ Success ─ acknowledge ─→ Idle
//!                                     └─→ Failed  ─ acknowledge ─→ Idle
//! ```
//!
//! A second `request_verdict` while `InFlight` is rejected with `Busy`.
//! Dropping the in-flight future puts the session back to `Idle`.

use court_core::{CaseInput, Mode, RequestContext, Verdict, VerdictError};
use court_prompt::{verdict_response_schema, PromptRenderer};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::client::{GenerationRequest, GenerativeClient};
use crate::parse::parse_verdict;

/// Upper bound on one request/response cycle
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InFlight,
    Success,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Success | SessionState::Failed)
    }
}

pub struct VerdictSession<G> {
    client: G,
    renderer: PromptRenderer,
    timeout: Option<Duration>,
    state: Mutex<SessionState>,
}

impl<G: GenerativeClient> VerdictSession<G> {
    pub fn new(client: G, renderer: PromptRenderer) -> Self {
        Self {
            client,
            renderer,
            timeout: Some(DEFAULT_TIMEOUT),
            state: Mutex::new(SessionState::Idle),
        }
    }

    /// `None` waits for the service indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn renderer(&self) -> &PromptRenderer {
        &self.renderer
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    /// Observe a terminal state and return to `Idle`
    pub fn acknowledge(&self) -> SessionState {
        let mut state = lock(&self.state);
        let observed = *state;
        if observed.is_terminal() {
            *state = SessionState::Idle;
        }
        observed
    }

    /// Run one request/response cycle.
    ///
    /// Makes at most one outbound call. Never mutates usage state; the caller
    /// records the issuance once this returns `Ok`.
    pub async fn request_verdict(
        &self,
        input: &CaseInput,
        mode: Mode,
    ) -> Result<Verdict, VerdictError> {
        let flight = Flight::begin(&self.state)?;
        let ctx = RequestContext::new(mode);

        let result = self.run_cycle(input, &ctx).await;
        flight.finish(result.is_ok());

        match &result {
            Ok(verdict) => tracing::info!(
                trace_id = %ctx.trace_id,
                mode = %ctx.mode,
                winner = %verdict.winner,
                elapsed_ms = ctx.elapsed_ms(),
                "verdict delivered"
            ),
            Err(VerdictError::Validation(reason)) => {
                tracing::debug!(trace_id = %ctx.trace_id, "case rejected: {}", reason)
            }
            Err(e) => tracing::error!(
                trace_id = %ctx.trace_id,
                elapsed_ms = ctx.elapsed_ms(),
                "judgment failed: {}",
                e
            ),
        }

        result
    }

    async fn run_cycle(
        &self,
        input: &CaseInput,
        ctx: &RequestContext,
    ) -> Result<Verdict, VerdictError> {
        input.validate()?;

        let prompt = self
            .renderer
            .render_prompt(input, ctx.mode)
            .map_err(|e| VerdictError::Prompt(e.to_string()))?;
        tracing::debug!(trace_id = %ctx.trace_id, prompt_len = prompt.len(), "prompt rendered");

        let request = GenerationRequest {
            prompt,
            response_schema: verdict_response_schema(),
        };

        let call = self.client.generate(&request);
        let reply = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(reply) => reply,
                Err(_) => return Err(VerdictError::Timeout(limit.as_millis() as u64)),
            },
            None => call.await,
        };

        parse_verdict(&reply?)
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks the session in flight; resets to `Idle` if dropped unfinished
struct Flight<'a> {
    state: &'a Mutex<SessionState>,
    finished: bool,
}

impl<'a> Flight<'a> {
    fn begin(state: &'a Mutex<SessionState>) -> Result<Self, VerdictError> {
        let mut guard = lock(state);
        if *guard == SessionState::InFlight {
            return Err(VerdictError::Busy);
        }
        *guard = SessionState::InFlight;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, success: bool) {
        *lock(self.state) = if success {
            SessionState::Success
        } else {
            SessionState::Failed
        };
        self.finished = true;
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = SessionState::Idle;
            tracing::debug!("verdict request cancelled");
        }
    }
}
