use tokio::io::{AsyncRead, AsyncWrite};

/// Abstract form of types that are capable of async IO and can be moved to
/// another task.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<S> Stream for S where S: AsyncRead + AsyncWrite + Unpin + Send + ?Sized {}
