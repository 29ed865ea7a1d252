//! Petty Court: two statements, one verdict, three per day
pub mod config;
pub mod court;
pub mod error;
pub mod terminal;
pub mod unlock;

pub use config::CourtConfig;
pub use court::{Court, Judgment, UnlockReceipt};
pub use error::CourtError;
pub use terminal::Terminal;
pub use unlock::{
    ActionError, ClipboardAction, ShareAction, ShareInvite, UnlockAction, UnlockOffer,
    UnlockOutcome,
};

use court_limiter::{FileStore, SystemClock, UsageLimiter};
use court_prompt::{PersonaBook, PromptRenderer};
use court_session::{GeminiClient, GeminiConfig, VerdictSession};
use tokio::io::BufReader;

/// The production court: Gemini, file-backed usage, wall clock
pub type AppCourt = Court<GeminiClient, FileStore, SystemClock>;

pub fn build_court(config: &CourtConfig) -> Result<AppCourt, CourtError> {
    let book = match &config.personas_path {
        Some(path) => PersonaBook::load(path)?,
        None => PersonaBook::builtin()?,
    };
    let renderer = PromptRenderer::new(book)?;

    let client = GeminiClient::new(
        GeminiConfig::new(config.api_key.clone())
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone()),
    )
    .map_err(|e| CourtError::Config(e.to_string()))?;
    let session = VerdictSession::new(client, renderer).with_timeout(config.timeout);

    let store = match &config.storage_path {
        Some(path) => FileStore::new(path.clone()),
        None => FileStore::in_data_dir().map_err(|e| CourtError::Config(e.to_string()))?,
    };
    tracing::info!("usage state at {}", store.path().display());
    let limiter = UsageLimiter::new(store).with_limit(config.daily_limit);

    Ok(Court::new(
        limiter,
        session,
        SystemClock,
        UnlockOffer::standard(),
        config.share_url.clone(),
    ))
}

/// Serve the terminal on stdin/stdout until the user quits
pub async fn run(config: CourtConfig) -> Result<(), CourtError> {
    let mut court = build_court(&config)?;
    tracing::info!(
        "Petty Court v{} in session (model {})",
        court_core::COURT_VERSION,
        config.model
    );

    let mut terminal = Terminal::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    terminal.run(&mut court).await
}
