use std::path::PathBuf;

use clap::{Parser, Subcommand};
use countdown::client::app::{Command as ClientCommand, QueryArguments, SetArguments};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init {
        /// Path to the daemon executable
        #[arg(short, long)]
        executable: Option<PathBuf>,
        /// Maximum logging level the daemon should use
        #[arg(short, long, default_value_t = Level::INFO)]
        verbosity: Level,
    },
    /// Start a countdown from now. Ask for the end if it is not given.
    Set {
        /// End of the countdown as HH:MM or YYYY-MM-DD HH:MM
        #[arg(short, long)]
        end: Option<String>,
    },
    /// Drop the countdown
    Clear,
    /// Query the countdown's status. Show all information if no flag is specified.
    Query {
        /// Show the countdown's state
        #[arg(long)]
        state: bool,
        /// Show when the countdown started
        #[arg(long)]
        start: bool,
        /// Show when the countdown ends
        #[arg(long)]
        end: bool,
        /// Show the elapsed percentage
        #[arg(short, long)]
        progress: bool,
        /// Show the remaining seconds
        #[arg(short, long)]
        remaining: bool,
        /// Show the remaining time as text
        #[arg(short, long)]
        label: bool,
    },
    /// Show a status line with the current time until the countdown stops
    Watch,
}

impl From<Command> for ClientCommand {
    fn from(value: Command) -> Self {
        match value {
            Command::Init { .. } => Self::Init,
            Command::Set { end } => Self::Set(SetArguments { end }),
            Command::Clear => Self::Clear,
            Command::Query {
                state,
                start,
                end,
                progress,
                remaining,
                label,
            } => Self::Query(QueryArguments {
                state,
                start,
                end,
                progress,
                remaining,
                label,
            }),
            Command::Watch => Self::Watch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn arguments_parse() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn arguments_into_client_command() {
        let args = Arguments::parse_from(["countdown", "set", "--end", "17:30"]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Set(SetArguments {
                end: Some("17:30".to_owned())
            })
        );

        let args = Arguments::parse_from(["countdown", "query", "-r", "--end"]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Query(QueryArguments {
                end: true,
                remaining: true,
                ..Default::default()
            })
        );
    }
}
