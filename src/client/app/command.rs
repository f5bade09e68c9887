#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init,
    /// Start a countdown which ends at a given time
    Set(SetArguments),
    /// Drop the countdown
    Clear,
    /// Query the countdown's status. Show all information if no flag is
    /// specified.
    Query(QueryArguments),
    /// Redraw the status line every second until the countdown stops running
    Watch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetArguments {
    /// End of the countdown as `HH:MM` or `YYYY-MM-DD HH:MM`. Ask
    /// interactively if absent.
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArguments {
    pub state: bool,
    pub start: bool,
    pub end: bool,
    pub progress: bool,
    pub remaining: bool,
    pub label: bool,
}

impl QueryArguments {
    /// Returns `true` if no field is selected explicitly.
    pub fn is_empty(&self) -> bool {
        !(self.state || self.start || self.end || self.progress || self.remaining || self.label)
    }
}
