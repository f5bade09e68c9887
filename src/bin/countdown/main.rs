mod cli;
mod setup;

use clap::Parser;
use snafu::{prelude::*, Whatever};
use tracing::Level;

use crate::cli::Arguments;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let args = Arguments::parse();

    // Standard output belongs to query and watch.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;

    let client = setup::bootstrap(&args)?;
    client
        .run(args.command.into())
        .await
        .whatever_context("Command failed")
}
