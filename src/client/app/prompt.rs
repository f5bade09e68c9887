use std::io::Error as IoError;

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use snafu::prelude::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::entity::{Dialog, DialogOutcome, DialogTransitionError};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const TIME_FORMAT: &str = "%H:%M";

/// A line based dialog that asks for the end of the countdown.
///
/// An empty answer accepts the suggested end, `clear` drops the countdown
/// and `cancel` or the end of input leaves everything as it is.
pub struct Prompt<R, W> {
    reader: R,
    writer: W,
    dialog: Dialog,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            dialog: Dialog::new(),
        }
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// Open the dialog, read answers until one is understood and close the
    /// dialog with it. The dialog is closed with [`DialogOutcome::Cancel`] if
    /// reading or writing fails.
    ///
    /// # Errors
    ///
    /// This function will return an error if the terminal is not usable or
    /// the dialog is already open.
    pub async fn ask<Tz: TimeZone>(&mut self, now: DateTime<Tz>) -> Result<DialogOutcome, PromptError> {
        self.dialog.open().context(DialogSnafu)?;

        let res = self.read_outcome(default_end(&now)).await;
        let outcome = res.as_ref().copied().unwrap_or(DialogOutcome::Cancel);
        self.dialog.close(outcome).context(DialogSnafu)?;
        res
    }

    async fn read_outcome<Tz: TimeZone>(
        &mut self,
        default: DateTime<Tz>,
    ) -> Result<DialogOutcome, PromptError> {
        let suggestion = default.naive_local().format(DATE_TIME_FORMAT).to_string();
        let mut line = String::new();

        loop {
            let question = format!("End of countdown [{suggestion}]: ");
            self.write(&question).await?;

            line.clear();
            if self.reader.read_line(&mut line).await.context(TerminalSnafu)? == 0 {
                return Ok(DialogOutcome::Cancel);
            }

            match line.trim() {
                "" => return Ok(DialogOutcome::Submit(default.with_timezone(&Utc))),
                "clear" => return Ok(DialogOutcome::Clear),
                "cancel" => return Ok(DialogOutcome::Cancel),
                input => match parse_end(input, &default) {
                    Some(end) => return Ok(DialogOutcome::Submit(end.with_timezone(&Utc))),
                    None => {
                        let hint = format!(
                            "Could not understand {input:?}, expected HH:MM or YYYY-MM-DD HH:MM\n"
                        );
                        self.write(&hint).await?;
                    }
                },
            }
        }
    }

    async fn write(&mut self, text: &str) -> Result<(), PromptError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .context(TerminalSnafu)?;
        self.writer.flush().await.context(TerminalSnafu)
    }
}

/// Two hours from `now`, rounded down to the full hour.
pub fn default_end<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let end = now.clone() + TimeDelta::hours(2);
    end.with_minute(0)
        .and_then(|end| end.with_second(0))
        .and_then(|end| end.with_nanosecond(0))
        .unwrap_or(end)
}

/// Parse `YYYY-MM-DD HH:MM`, or `HH:MM` on the day of `default`, in the time
/// zone of `default`.
pub fn parse_end<Tz: TimeZone>(input: &str, default: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let input = input.trim();
    let naive = NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT)
        .or_else(|_| {
            NaiveTime::parse_from_str(input, TIME_FORMAT)
                .map(|time| default.naive_local().date().and_time(time))
        })
        .ok()?;
    default.timezone().from_local_datetime(&naive).earliest()
}

/// An error type of asking for the countdown's end.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PromptError {
    #[snafu(display("Could not talk to the terminal"))]
    Terminal { source: IoError },
    #[snafu(display("Could not change the dialog's visibility"))]
    Dialog { source: DialogTransitionError },
}
