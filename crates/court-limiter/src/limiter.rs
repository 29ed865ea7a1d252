//! UsageLimiter: at most `limit` verdicts per rolling window
//!
//! Every operation takes the current `UsageState` and returns the new one;
//! persistence goes through the injected `UsageStore`. Storage failures are
//! soft: they are logged and the last state this limiter saw is used instead.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Mutex, MutexGuard};
use court_core::{
    StorageError, UsageState, DAILY_LIMIT, STORAGE_KEY_COUNT, STORAGE_KEY_LAST_RESET,
};

use crate::storage::UsageStore;

/// Length of the counting window
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

pub struct UsageLimiter<S> {
    store: S,
    limit: u32,
    window: TimeDelta,
    /// Last state read or written; stands in for the store when it fails
    last_known: Mutex<Option<UsageState>>,
}

impl<S: UsageStore> UsageLimiter<S> {
    /// Limiter with the default quota of `DAILY_LIMIT` per 24 hours
    pub fn new(store: S) -> Self {
        Self {
            store,
            limit: DAILY_LIMIT,
            window: TimeDelta::hours(DEFAULT_WINDOW_HOURS),
            last_known: Mutex::new(None),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_window(mut self, window: TimeDelta) -> Self {
        self.window = window;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Load the persisted state, initialising or resetting it as needed.
    ///
    /// Must run before every allow/deny decision, since a session can stay
    /// open across the window boundary.
    pub fn check_and_maybe_reset(&self, now: DateTime<Utc>) -> UsageState {
        let stored = match self.load() {
            Ok(stored) => stored,
            Err(e) => {
                let cached = *self.last_known();
                tracing::warn!(
                    in_memory = cached.is_some(),
                    "usage storage unavailable, using in-memory state: {}",
                    e
                );
                cached
            }
        };

        match stored {
            Some(state) if state.window_elapsed(now, self.window) => {
                tracing::info!(
                    previous_count = state.count,
                    "usage window elapsed, resetting count"
                );
                let state = UsageState::fresh(now);
                self.persist(&state);
                state
            }
            Some(state) => {
                *self.last_known() = Some(state);
                state
            }
            None => {
                tracing::debug!("no usage state recorded, initialising");
                let state = UsageState::fresh(now);
                self.persist(&state);
                state
            }
        }
    }

    /// Pure predicate: is another verdict allowed?
    pub fn can_issue(&self, state: &UsageState) -> bool {
        state.count < self.limit
    }

    /// Count one successful verdict. Never call for failed or blocked requests.
    pub fn record_issuance(&self, state: UsageState) -> UsageState {
        let state = UsageState {
            count: state.count.saturating_add(1),
            ..state
        };
        tracing::info!(count = state.count, limit = self.limit, "verdict recorded");
        self.persist(&state);
        state
    }

    /// Reset the count to zero; the window start is kept
    pub fn unlock(&self, state: UsageState) -> UsageState {
        let state = UsageState { count: 0, ..state };
        tracing::info!("court unlocked");
        self.persist(&state);
        state
    }

    /// Verdicts left in the current window
    pub fn remaining(&self, state: &UsageState) -> u32 {
        state.remaining(self.limit)
    }

    /// Read both keys; anything missing or unparseable counts as absent
    fn load(&self) -> Result<Option<UsageState>, StorageError> {
        let count = self.store.get(STORAGE_KEY_COUNT)?;
        let last_reset = self.store.get(STORAGE_KEY_LAST_RESET)?;

        let (Some(count), Some(last_reset)) = (count, last_reset) else {
            return Ok(None);
        };

        let count = count.trim().parse::<u32>().ok();
        let last_reset = last_reset
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        match (count, last_reset) {
            (Some(count), Some(last_reset)) => Ok(Some(UsageState { count, last_reset })),
            _ => {
                tracing::warn!("stored usage state is not numeric, ignoring it");
                Ok(None)
            }
        }
    }

    fn persist(&self, state: &UsageState) {
        *self.last_known() = Some(*state);

        let count = state.count.to_string();
        let last_reset = state.last_reset.timestamp_millis().to_string();
        let result = self.store.set_many(&[
            (STORAGE_KEY_COUNT, count.as_str()),
            (STORAGE_KEY_LAST_RESET, last_reset.as_str()),
        ]);

        if let Err(e) = result {
            tracing::warn!("failed to persist usage state: {}", e);
        }
    }

    fn last_known(&self) -> MutexGuard<'_, Option<UsageState>> {
        self.last_known.lock().unwrap_or_else(|e| e.into_inner())
    }
}
