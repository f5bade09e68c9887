use std::fmt::Display;
use std::io::{Error as IoError, Write};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use snafu::prelude::*;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;
use tokio::time::{Duration, MissedTickBehavior};

use crate::client::app::command::{Command, QueryArguments, SetArguments};
use crate::client::app::prompt::{parse_end, Prompt, PromptError};
use crate::domain::client::outbound::{InitDaemonError, QueryResponse, RequestDaemonError};
use crate::domain::client::ApplicationCore;
use crate::domain::entity::{CountdownState, DialogEvent, DialogOutcome};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const PROGRESS_BAR_WIDTH: usize = 20;

/// Main business logic implementation in client side.
pub struct Client {
    core: Arc<ApplicationCore>,
}

impl Client {
    /// Creates a new [`Client`].
    pub fn new(core: Arc<ApplicationCore>) -> Self {
        Self { core }
    }

    /// Run specific function according to `command`.
    ///
    /// # Errors
    ///
    /// This function will return an error if any error occurs.
    pub async fn run(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Init => self.init().await,
            Command::Set(args) => self.set(args).await,
            Command::Clear => self.clear().await,
            Command::Query(args) => self.query(args).await,
            Command::Watch => self.watch().await,
        }
    }

    async fn init(&self) -> Result<(), ClientError> {
        self.core.init.init().await.context(InitDaemonSnafu)
    }

    /// Take the end from `args` or ask for it on the terminal, then apply
    /// whatever the user decided.
    async fn set(&self, args: SetArguments) -> Result<(), ClientError> {
        match args.end {
            Some(input) => match parse_end(&input, &Local::now()) {
                Some(end) => {
                    let outcome = DialogOutcome::Submit(end.with_timezone(&Utc));
                    self.apply(outcome, Utc::now()).await
                }
                None => InvalidEndSnafu { input }.fail(),
            },
            None => {
                let reader = BufReader::new(tokio::io::stdin());
                let mut prompt = Prompt::new(reader, tokio::io::stdout());
                self.prompt(&mut prompt, Local::now()).await
            }
        }
    }

    /// Run the dialog of `prompt` and apply the outcome it announces while
    /// closing.
    async fn prompt<R, W, Tz>(
        &self,
        prompt: &mut Prompt<R, W>,
        now: DateTime<Tz>,
    ) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        Tz: TimeZone,
    {
        let mut events = prompt.dialog().subscribe();
        prompt.ask(now).await.context(PromptSnafu)?;

        let outcome = closing_outcome(&mut events).unwrap_or(DialogOutcome::Cancel);
        self.apply(outcome, Utc::now()).await
    }

    async fn apply(&self, outcome: DialogOutcome, now: DateTime<Utc>) -> Result<(), ClientError> {
        match outcome {
            DialogOutcome::Submit(end) => self.core.set.set(now, end).await.context(RequestSnafu),
            DialogOutcome::Clear => self.clear().await,
            DialogOutcome::Cancel => {
                tracing::debug!("Countdown left unchanged");
                Ok(())
            }
        }
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.core.clear.clear().await.context(RequestSnafu)
    }

    async fn query(&self, args: QueryArguments) -> Result<(), ClientError> {
        let response = self.core.query.query().await.context(RequestSnafu)?;
        print!("{}", align(query_lines(&response, &args, &Local)));
        Ok(())
    }

    /// Redraw one status line every second while the countdown is running.
    async fn watch(&self) -> Result<(), ClientError> {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stdout = std::io::stdout();

        loop {
            ticker.tick().await;
            let response = self.core.query.query().await.context(RequestSnafu)?;

            write!(stdout, "\r\x1b[2K{}", status_line(&Local::now(), &response))
                .and_then(|()| stdout.flush())
                .context(TerminalSnafu)?;

            if response.state != CountdownState::Running.to_string() {
                writeln!(stdout).context(TerminalSnafu)?;
                return Ok(());
            }
        }
    }
}

/// The outcome of the first [`DialogEvent::Closing`] among the events
/// already sent.
fn closing_outcome(events: &mut Receiver<DialogEvent>) -> Option<DialogOutcome> {
    loop {
        match events.try_recv() {
            Ok(DialogEvent::Closing(outcome)) => return Some(outcome),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return None,
        }
    }
}

fn query_lines<Tz>(
    response: &QueryResponse,
    args: &QueryArguments,
    tz: &Tz,
) -> Vec<(&'static str, String)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let all = args.is_empty();
    let timestamp = |value: Option<DateTime<Utc>>| match value {
        Some(value) => value.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => "-".to_owned(),
    };

    let mut outputs = Vec::new();
    if all || args.state {
        outputs.push(("State", response.state.clone()));
    }
    if all || args.start {
        outputs.push(("Start", timestamp(response.start)));
    }
    if all || args.end {
        outputs.push(("End", timestamp(response.end)));
    }
    if all || args.progress {
        outputs.push(("Progress", format!("{:.1}%", response.progress)));
    }
    if all || args.remaining {
        outputs.push(("Remaining", format!("{}s", response.remaining.as_secs())));
    }
    if all || args.label {
        outputs.push(("Label", response.label.clone()));
    }
    outputs
}

fn align(outputs: Vec<(&'static str, String)>) -> String {
    let width = outputs
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or_default();

    outputs
        .into_iter()
        .map(|(key, value)| format!("{key:<width$} = {value}\n"))
        .collect()
}

fn status_line<Tz>(now: &DateTime<Tz>, response: &QueryResponse) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let filled = ((response.progress / 100.0) * PROGRESS_BAR_WIDTH as f64)
        .round()
        .clamp(0.0, PROGRESS_BAR_WIDTH as f64) as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    );
    let marker = if response.blink { '!' } else { ' ' };

    format!(
        "{}  [{bar}] {:>5.1}% {marker} {}",
        now.format("%H:%M:%S"),
        response.progress,
        response.label
    )
    .trim_end()
    .to_owned()
}

/// An error for client's operations.
#[derive(Debug, Snafu)]
pub enum ClientError {
    #[snafu(display("Could not initialize daemon"))]
    InitDaemon { source: InitDaemonError },
    #[snafu(display("Could not request daemon"))]
    Request { source: RequestDaemonError },
    #[snafu(display("Could not ask for the end of the countdown"))]
    Prompt { source: PromptError },
    #[snafu(display("Could not understand end {input:?}, expected HH:MM or YYYY-MM-DD HH:MM"))]
    InvalidEnd { input: String },
    #[snafu(display("Could not write to the terminal"))]
    Terminal { source: IoError },
}
