/// Log an error with its whole source chain at the `ERROR` level, optionally
/// followed by the usual `tracing` message arguments.
#[macro_export]
macro_rules! tracing_report {
    ($error:expr) => {
        tracing::error!(err = %snafu::Report::from_error(&$error))
    };
    ($error:expr, $($message:tt)+) => {
        tracing::error!(err = %snafu::Report::from_error(&$error), $($message)+)
    };
}
