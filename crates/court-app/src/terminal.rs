//! Line-oriented front-end: two statements in, a decree out.
//!
//! Commands accepted at either prompt: `:mode`, `:remaining`, `:quit`.

use court_core::CaseInput;
use court_limiter::{Clock, UsageStore};
use court_session::GenerativeClient;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::court::Court;
use crate::error::CourtError;

/// What the user typed at a prompt
enum Entry {
    Text(String),
    ToggleMode,
    Remaining,
    Quit,
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Serve cases until `:quit` or end of input
    pub async fn run<G, S, C>(&mut self, court: &mut Court<G, S, C>) -> Result<(), CourtError>
    where
        G: GenerativeClient,
        S: UsageStore,
        C: Clock,
    {
        self.banner(court).await?;

        loop {
            let placeholder = court.renderer().copy(court.mode())?.plaintiff_placeholder.clone();
            let plaintiff = match self.ask(&format!("Plaintiff ({}) > ", placeholder)).await? {
                Entry::Text(text) => text,
                Entry::ToggleMode => {
                    court.toggle_mode();
                    self.banner(court).await?;
                    continue;
                }
                Entry::Remaining => {
                    self.show_remaining(court).await?;
                    continue;
                }
                Entry::Quit => break,
            };

            // Commands at this prompt keep the plaintiff's statement
            let defendant = loop {
                let placeholder =
                    court.renderer().copy(court.mode())?.defendant_placeholder.clone();
                match self.ask(&format!("Defendant ({}) > ", placeholder)).await? {
                    Entry::Text(text) => break Some(text),
                    Entry::ToggleMode => {
                        court.toggle_mode();
                        self.banner(court).await?;
                    }
                    Entry::Remaining => self.show_remaining(court).await?,
                    Entry::Quit => break None,
                }
            };
            let Some(defendant) = defendant else {
                break;
            };

            self.hear_case(court, CaseInput::new(plaintiff, defendant)).await?;
        }

        self.say("Court is adjourned.").await
    }

    async fn hear_case<G, S, C>(
        &mut self,
        court: &Court<G, S, C>,
        input: CaseInput,
    ) -> Result<(), CourtError>
    where
        G: GenerativeClient,
        S: UsageStore,
        C: Clock,
    {
        if input.validate().is_ok() && court.can_issue() {
            let copy = court.renderer().copy(court.mode())?;
            let line = format!("{} - {}", copy.loading_title, copy.loading_message);
            self.say(&line).await?;
        }

        match court.judge(&input).await {
            Ok(judgment) => {
                let card = court.render_card(&judgment)?;
                self.say(&card).await?;
                self.say(&format!(
                    "Verdicts remaining today: {}/{}",
                    judgment.remaining,
                    court.limit()
                ))
                .await
            }
            Err(CourtError::LimitReached { .. }) => self.offer_unlock(court).await,
            Err(CourtError::Verdict(e)) if e.is_retryable() => {
                self.say(&CourtError::Verdict(e).user_message()).await?;
                self.say("No verdict was counted. Submit the case again to retry.")
                    .await
            }
            Err(e) => self.say(&e.user_message()).await,
        }
    }

    async fn offer_unlock<G, S, C>(&mut self, court: &Court<G, S, C>) -> Result<(), CourtError>
    where
        G: GenerativeClient,
        S: UsageStore,
        C: Clock,
    {
        let notice = court.renderer().limit_notice(court.mode(), court.limit())?;
        let title = court.renderer().copy(court.mode())?.unlock_title.clone();

        self.say("COURT ADJOURNED").await?;
        self.say(&notice).await?;
        self.say(&format!(
            "{}: share Petty Court to unlock {} more verdicts immediately.",
            title,
            court.limit()
        ))
        .await?;

        let answer = self.read_line("Share to unlock? [Y/n] > ").await?;
        let declined = matches!(
            answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref(),
            Some("n") | Some("no") | None
        );
        if declined {
            return self.say("The court remains adjourned.").await;
        }

        let receipt = court.unlock();
        self.say(receipt.outcome.notice()).await
    }

    async fn banner<G, S, C>(&mut self, court: &Court<G, S, C>) -> Result<(), CourtError>
    where
        G: GenerativeClient,
        S: UsageStore,
        C: Clock,
    {
        let copy = court.renderer().copy(court.mode())?;
        let banner = format!(
            "== PETTY COURT [{}] ==\n{}\n{}\n(:mode toggles the judge, :remaining shows your quota, :quit leaves)",
            copy.mode_label, copy.heading, copy.subheading
        );
        self.say(&banner).await?;
        self.show_remaining(court).await
    }

    async fn show_remaining<G, S, C>(&mut self, court: &Court<G, S, C>) -> Result<(), CourtError>
    where
        G: GenerativeClient,
        S: UsageStore,
        C: Clock,
    {
        let line = format!(
            "Verdicts remaining today: {}/{}",
            court.remaining(),
            court.limit()
        );
        self.say(&line).await
    }

    async fn ask(&mut self, prompt: &str) -> Result<Entry, CourtError> {
        let Some(line) = self.read_line(prompt).await? else {
            return Ok(Entry::Quit);
        };
        Ok(match line.trim() {
            ":quit" | ":q" => Entry::Quit,
            ":mode" => Entry::ToggleMode,
            ":remaining" => Entry::Remaining,
            _ => Entry::Text(line),
        })
    }

    /// `None` at end of input
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, CourtError> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn say(&mut self, text: &str) -> Result<(), CourtError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
