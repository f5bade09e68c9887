use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use snafu::prelude::*;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Visibility state of a modal dialog which collects the countdown's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Opening,
    Opened,
    Closing,
}

impl Display for DialogState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Opening => f.write_str("opening"),
            Self::Opened => f.write_str("opened"),
            Self::Closing => f.write_str("closing"),
        }
    }
}

/// How the user dismissed the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Submit(DateTime<Utc>),
    Clear,
    Cancel,
}

/// A visibility change broadcast to every subscriber of a [`Dialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Opening,
    Opened,
    Closing(DialogOutcome),
    Closed(DialogOutcome),
}

/// A modal dialog lifecycle. Every visibility change passes through an
/// intermediate state and is announced to subscribers in order:
/// `Opening`, `Opened` on [`Dialog::open`] and `Closing`, `Closed` on
/// [`Dialog::close`].
#[derive(Debug)]
pub struct Dialog {
    state: DialogState,
    events: Sender<DialogEvent>,
}

impl Dialog {
    /// Creates a new closed [`Dialog`].
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            state: DialogState::Closed,
            events,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    /// Subscribe to the visibility changes happening from now on.
    pub fn subscribe(&self) -> Receiver<DialogEvent> {
        self.events.subscribe()
    }

    /// Show the dialog.
    ///
    /// # Errors
    ///
    /// This function will return an error if the dialog is not closed.
    pub fn open(&mut self) -> Result<(), DialogTransitionError> {
        ensure!(
            self.state == DialogState::Closed,
            InvalidSnafu {
                from: self.state,
                to: DialogState::Opening,
            }
        );

        self.transit(DialogState::Opening, DialogEvent::Opening);
        self.transit(DialogState::Opened, DialogEvent::Opened);
        Ok(())
    }

    /// Hide the dialog with the given outcome.
    ///
    /// # Errors
    ///
    /// This function will return an error if the dialog is not opened.
    pub fn close(&mut self, outcome: DialogOutcome) -> Result<(), DialogTransitionError> {
        ensure!(
            self.state == DialogState::Opened,
            InvalidSnafu {
                from: self.state,
                to: DialogState::Closing,
            }
        );

        self.transit(DialogState::Closing, DialogEvent::Closing(outcome));
        self.transit(DialogState::Closed, DialogEvent::Closed(outcome));
        Ok(())
    }

    fn transit(&mut self, state: DialogState, event: DialogEvent) {
        self.state = state;
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}

/// An error type of an invalid [`Dialog`] transition.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum DialogTransitionError {
    #[snafu(display("Could not move a dialog from {from} to {to}"))]
    #[non_exhaustive]
    Invalid { from: DialogState, to: DialogState },
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn dialog_lifecycle() {
        let mut dialog = Dialog::new();
        let mut events = dialog.subscribe();
        assert_eq!(dialog.state(), DialogState::Closed);

        dialog.open().unwrap();
        assert_eq!(dialog.state(), DialogState::Opened);

        let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        dialog.close(DialogOutcome::Submit(end)).unwrap();
        assert_eq!(dialog.state(), DialogState::Closed);

        assert_eq!(events.try_recv().unwrap(), DialogEvent::Opening);
        assert_eq!(events.try_recv().unwrap(), DialogEvent::Opened);
        assert_eq!(
            events.try_recv().unwrap(),
            DialogEvent::Closing(DialogOutcome::Submit(end))
        );
        assert_eq!(
            events.try_recv().unwrap(),
            DialogEvent::Closed(DialogOutcome::Submit(end))
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn dialog_reopen() {
        let mut dialog = Dialog::new();
        dialog.open().unwrap();
        dialog.close(DialogOutcome::Cancel).unwrap();

        let mut events = dialog.subscribe();
        dialog.open().unwrap();
        assert_eq!(events.try_recv().unwrap(), DialogEvent::Opening);
    }

    #[test]
    fn dialog_error_invalid_transition() {
        let mut dialog = Dialog::new();
        assert_eq!(
            dialog.close(DialogOutcome::Clear),
            Err(DialogTransitionError::Invalid {
                from: DialogState::Closed,
                to: DialogState::Closing,
            })
        );

        dialog.open().unwrap();
        assert_eq!(
            dialog.open(),
            Err(DialogTransitionError::Invalid {
                from: DialogState::Opened,
                to: DialogState::Opening,
            })
        );
    }
}
