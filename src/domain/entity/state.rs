use std::fmt::{Display, Formatter, Result as FmtResult};

/// The lifecycle state of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Expired,
}

impl Display for CountdownState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Running => f.write_str("Running"),
            Self::Expired => f.write_str("Expired"),
        }
    }
}
