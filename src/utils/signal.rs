use std::io::Error as IoError;

use tokio::signal::unix::{signal, SignalKind};

/// Wait until the process receives SIGTERM or SIGINT.
///
/// # Errors
///
/// This function will return an error if the signal handlers could not be
/// registered.
pub async fn shutdown_signal() -> Result<(), IoError> {
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = terminate.recv() => tracing::info!("Received SIGTERM"),
        _ = interrupt.recv() => tracing::info!("Received SIGINT"),
    }
    Ok(())
}
