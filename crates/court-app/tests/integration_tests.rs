//! End-to-end court tests: stub service, in-memory usage, manual clock

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use court_app::{
    ActionError, Court, CourtError, ShareInvite, Terminal, UnlockAction, UnlockOffer,
    UnlockOutcome,
};
use court_core::{
    CaseInput, Party, StorageError, VerdictError, STORAGE_KEY_COUNT, STORAGE_KEY_LAST_RESET,
};
use court_limiter::{ManualClock, MemoryStore, UsageLimiter, UsageStore};
use court_prompt::PromptRenderer;
use court_session::{ClientError, GenerationRequest, GenerativeClient, VerdictSession};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const VERDICT_JSON: &str =
    r#"{"winner":"Plaintiff","sentence":"Pay $5","roast":"lol","detailed_verdict":"obvious"}"#;

/// Replies with a fixed body and counts calls
struct StubClient {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl StubClient {
    fn replying(body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(body.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeClient for StubClient {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(ClientError::Server {
                status: *status,
                message: "upstream overloaded".to_string(),
            }),
        }
    }
}

/// Never answers within a test's patience
struct SlowClient {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerativeClient for SlowClient {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(VERDICT_JSON.to_string())
    }
}

/// Storage that rejects every read and write
struct BrokenStore;

impl UsageStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}

struct FailingAction {
    attempts: Arc<AtomicUsize>,
}

impl UnlockAction for FailingAction {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn outcome(&self) -> UnlockOutcome {
        UnlockOutcome::Shared
    }

    fn attempt(&self, _invite: &ShareInvite) -> Result<(), ActionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ActionError::Unavailable("share sheet"))
    }
}

type TestCourt = Court<Arc<StubClient>, Arc<MemoryStore>, Arc<ManualClock>>;

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn store_with(count: u32, last_reset: DateTime<Utc>) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_values([
        (STORAGE_KEY_COUNT, count.to_string()),
        (STORAGE_KEY_LAST_RESET, last_reset.timestamp_millis().to_string()),
    ]))
}

fn court_with(
    client: Arc<StubClient>,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    offer: UnlockOffer,
) -> TestCourt {
    let session = VerdictSession::new(client, PromptRenderer::builtin().unwrap());
    Court::new(
        UsageLimiter::new(store),
        session,
        clock,
        offer,
        "https://petty-court.app",
    )
}

fn stored_count(store: &MemoryStore) -> Option<String> {
    store.get(STORAGE_KEY_COUNT).unwrap()
}

#[tokio::test]
async fn test_fresh_court_calls_service_and_counts_verdict() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let input = CaseInput::new("He ate my leftovers", "It had no name on it");
    let judgment = court.judge(&input).await.unwrap();

    assert_eq!(client.calls(), 1);
    assert_eq!(judgment.verdict.winner, Party::Plaintiff);
    assert_eq!(judgment.verdict.sentence, "Pay $5");
    assert_eq!(judgment.verdict.roast, "lol");
    assert_eq!(judgment.verdict.detailed_verdict, "obvious");
    assert!((1000..=9999).contains(&judgment.case_number));
    assert_eq!(judgment.remaining, 2);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_exhausted_quota_skips_the_service() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = store_with(3, start());
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(1)));
    let court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    assert!(!court.can_issue());
    let err = court
        .judge(&CaseInput::new("He ate my leftovers", "It had no name on it"))
        .await
        .unwrap_err();

    assert!(matches!(err, CourtError::LimitReached { limit: 3 }));
    assert_eq!(client.calls(), 0);
    assert_eq!(stored_count(&store).as_deref(), Some("3"));
}

#[tokio::test]
async fn test_malformed_reply_leaves_count_alone() {
    let client = StubClient::replying("not json");
    let store = store_with(1, start());
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let err = court.judge(&CaseInput::new("a", "b")).await.unwrap_err();

    assert!(matches!(
        err,
        CourtError::Verdict(VerdictError::MalformedResponse(_))
    ));
    assert_eq!(client.calls(), 1);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
    assert!(err.user_message().starts_with("Judgment failed: "));
}

#[tokio::test]
async fn test_service_error_leaves_count_alone() {
    let client = StubClient::failing(503);
    let store = store_with(2, start());
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client, store.clone(), clock, UnlockOffer::none());

    let err = court.judge(&CaseInput::new("a", "b")).await.unwrap_err();

    assert!(matches!(err, CourtError::Verdict(VerdictError::Network(_))));
    assert_eq!(stored_count(&store).as_deref(), Some("2"));
    assert_eq!(court.remaining(), 1);
}

#[tokio::test]
async fn test_blank_statement_is_rejected_before_any_call() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = store_with(1, start());
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let err = court
        .judge(&CaseInput::new("", "something"))
        .await
        .unwrap_err();

    assert!(matches!(err, CourtError::Verdict(VerdictError::Validation(_))));
    assert_eq!(err.user_message(), "Both sides must present their case!");
    assert_eq!(client.calls(), 0);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_quota_returns_after_the_window_rolls_over() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = store_with(3, start() - TimeDelta::hours(25));
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let usage = court.usage();
    assert_eq!(usage.count, 0);
    assert_eq!(usage.last_reset, start());
    assert!(court.can_issue());

    court.judge(&CaseInput::new("a", "b")).await.unwrap();
    assert_eq!(client.calls(), 1);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_limit_holds_until_exactly_one_window_passes() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = store_with(3, start());
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(24)));
    let court = court_with(client, store, clock.clone(), UnlockOffer::none());

    assert!(!court.can_issue());
    clock.advance(TimeDelta::milliseconds(1));
    assert!(court.can_issue());
}

#[tokio::test]
async fn test_three_verdicts_then_adjourned() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));
    let court = court_with(client.clone(), store, clock, UnlockOffer::none());
    let input = CaseInput::new("a", "b");

    for expected in [2, 1, 0] {
        let judgment = court.judge(&input).await.unwrap();
        assert_eq!(judgment.remaining, expected);
    }
    let err = court.judge(&input).await.unwrap_err();

    assert!(matches!(err, CourtError::LimitReached { .. }));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_unlock_succeeds_when_every_action_fails() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let offer = UnlockOffer::new(vec![
        Box::new(FailingAction {
            attempts: attempts.clone(),
        }),
        Box::new(FailingAction {
            attempts: attempts.clone(),
        }),
    ]);
    let store = store_with(3, start());
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(2)));
    let court = court_with(StubClient::replying(VERDICT_JSON), store.clone(), clock, offer);

    let receipt = court.unlock();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(receipt.outcome, UnlockOutcome::Unconfirmed);
    assert_eq!(receipt.state.count, 0);
    assert_eq!(receipt.state.last_reset, start());
    assert_eq!(stored_count(&store).as_deref(), Some("0"));
    assert!(court.can_issue());
}

#[tokio::test]
async fn test_unlock_invite_uses_mode_copy() {
    let clock = Arc::new(ManualClock::new(start()));
    let mut court = court_with(
        StubClient::replying(VERDICT_JSON),
        Arc::new(MemoryStore::new()),
        clock,
        UnlockOffer::none(),
    );

    let standard = court.invite().unwrap();
    court.toggle_mode();
    let naija = court.invite().unwrap();

    assert_eq!(standard.url, "https://petty-court.app");
    assert!(standard.text.contains("Petty Court"));
    assert!(naija.text.contains("village people"));
}

#[tokio::test]
async fn test_terminal_serves_a_case() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));
    let mut court = court_with(client.clone(), store, clock, UnlockOffer::none());

    let script = b"He ate my leftovers\nIt had no name on it\n:quit\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("State Your Case"));
    assert!(output.contains("Court is in Session - Polishing the Gavel..."));
    assert!(output.contains("OFFICIAL DECREE"));
    assert!(output.contains("WINNER: PLAINTIFF   [ GRANTED ]"));
    assert!(output.contains("\"Pay $5\""));
    assert!(output.contains("-- Hon. Judge GPT"));
    assert!(output.contains("Verdicts remaining today: 2/3"));
    assert!(output.ends_with("Court is adjourned.\n"));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_terminal_reports_blank_statement() {
    let client = StubClient::replying(VERDICT_JSON);
    let clock = Arc::new(ManualClock::new(start()));
    let mut court = court_with(
        client.clone(),
        Arc::new(MemoryStore::new()),
        clock,
        UnlockOffer::none(),
    );

    let script = b"   \nsomething\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("Both sides must present their case!"));
    assert!(!output.contains("Polishing the Gavel"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_terminal_mode_toggle_switches_persona() {
    let clock = Arc::new(ManualClock::new(start()));
    let mut court = court_with(
        StubClient::replying(VERDICT_JSON),
        Arc::new(MemoryStore::new()),
        clock,
        UnlockOffer::none(),
    );

    let script = b":mode\n:remaining\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("== PETTY COURT [Naija Mode] =="));
    assert!(output.contains("Oya, Talk True"));
    assert!(output.contains("Plaintiff (He did not return my Tupperware...) > "));
    assert_eq!(court.mode(), court_core::Mode::AlternatePersona);
}

#[tokio::test]
async fn test_terminal_unlocks_when_share_accepted() {
    let client = StubClient::replying(VERDICT_JSON);
    let store = store_with(3, start());
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(1)));
    let mut court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let script = b"a\nb\ny\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("COURT ADJOURNED"));
    assert!(output.contains("daily limit of 3 verdicts"));
    assert!(output.contains("Bribe the Court"));
    assert!(output.contains("Court unlocked!"));
    assert_eq!(client.calls(), 0);
    assert_eq!(stored_count(&store).as_deref(), Some("0"));
}

#[tokio::test]
async fn test_terminal_decline_keeps_court_adjourned() {
    let store = store_with(3, start());
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(1)));
    let mut court = court_with(
        StubClient::replying(VERDICT_JSON),
        store.clone(),
        clock,
        UnlockOffer::none(),
    );

    let script = b"a\nb\nn\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("The court remains adjourned."));
    assert!(!output.contains("Court unlocked!"));
    assert_eq!(stored_count(&store).as_deref(), Some("3"));
}

#[tokio::test]
async fn test_limit_holds_when_storage_is_broken() {
    let client = StubClient::replying(VERDICT_JSON);
    let session = VerdictSession::new(client.clone(), PromptRenderer::builtin().unwrap());
    let court = Court::new(
        UsageLimiter::new(BrokenStore),
        session,
        Arc::new(ManualClock::new(start())),
        UnlockOffer::none(),
        "https://petty-court.app",
    );
    let input = CaseInput::new("a", "b");

    let mut delivered = 0;
    for _ in 0..10 {
        if court.judge(&input).await.is_ok() {
            delivered += 1;
        }
    }

    assert_eq!(delivered, 3);
    assert_eq!(client.calls(), 3);
    assert_eq!(court.remaining(), 0);
    assert!(matches!(
        court.judge(&input).await,
        Err(CourtError::LimitReached { limit: 3 })
    ));

    // Unlock still works against the in-memory state
    assert_eq!(court.unlock().state.count, 0);
    assert!(court.judge(&input).await.is_ok());
}

#[tokio::test]
async fn test_timed_out_request_is_not_counted() {
    let client = Arc::new(SlowClient {
        calls: AtomicUsize::new(0),
    });
    let store = store_with(1, start());
    let session = VerdictSession::new(client.clone(), PromptRenderer::builtin().unwrap())
        .with_timeout(Some(Duration::from_millis(50)));
    let court = Court::new(
        UsageLimiter::new(store.clone()),
        session,
        Arc::new(ManualClock::new(start())),
        UnlockOffer::none(),
        "https://petty-court.app",
    );

    let err = court.judge(&CaseInput::new("a", "b")).await.unwrap_err();

    assert!(matches!(err, CourtError::Verdict(VerdictError::Timeout(50))));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
    assert_eq!(court.remaining(), 2);
}

#[tokio::test]
async fn test_abandoned_request_is_not_counted() {
    let client = Arc::new(SlowClient {
        calls: AtomicUsize::new(0),
    });
    let store = store_with(1, start());
    let session = VerdictSession::new(client.clone(), PromptRenderer::builtin().unwrap());
    let court = Court::new(
        UsageLimiter::new(store.clone()),
        session,
        Arc::new(ManualClock::new(start())),
        UnlockOffer::none(),
        "https://petty-court.app",
    );
    let input = CaseInput::new("a", "b");

    let abandoned = tokio::time::timeout(Duration::from_millis(50), court.judge(&input)).await;
    assert!(abandoned.is_err());
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));

    // The dropped request does not leave the court busy
    let again = tokio::time::timeout(Duration::from_millis(50), court.judge(&input)).await;
    assert!(again.is_err());
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_terminal_command_at_defendant_prompt_keeps_plaintiff() {
    let client = StubClient::replying(VERDICT_JSON);
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(MemoryStore::new());
    let mut court = court_with(client.clone(), store.clone(), clock, UnlockOffer::none());

    let script = b"He ate my leftovers\n:remaining\n:mode\nIt was just small rice\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert_eq!(output.matches("Plaintiff (").count(), 2);
    assert!(output.contains("Defendant (It was just small rice...) > "));
    assert!(output.contains("OFFICIAL DECREE"));
    assert!(output.contains("-- Mummy"));
    assert_eq!(client.calls(), 1);
    assert_eq!(stored_count(&store).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_terminal_suggests_retry_after_service_error() {
    let clock = Arc::new(ManualClock::new(start()));
    let mut court = court_with(
        StubClient::failing(503),
        Arc::new(MemoryStore::new()),
        clock,
        UnlockOffer::none(),
    );

    let script = b"a\nb\n";
    let mut terminal = Terminal::new(tokio::io::BufReader::new(&script[..]), Vec::new());
    terminal.run(&mut court).await.unwrap();
    let output = String::from_utf8(terminal.into_output()).unwrap();

    assert!(output.contains("Judgment failed: Server error: HTTP 503 - upstream overloaded"));
    assert!(output.contains("No verdict was counted. Submit the case again to retry."));
}
