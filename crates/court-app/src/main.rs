//! Binary entrypoint for the Petty Court terminal.
use court_app::{run, CourtConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Quiet by default so logs do not interleave with the prompts; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match CourtConfig::load() {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("petty-court: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
