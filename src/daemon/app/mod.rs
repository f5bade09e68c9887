pub mod listener;
pub mod server;
pub mod web;

pub use listener::{DuplexListener, ListenError, Listener, UnixListener};
pub use server::{Server, ServerError};
pub use web::{create_router, WebError, WebState};
