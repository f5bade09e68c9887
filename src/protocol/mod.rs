pub mod connection;
pub mod data;
pub mod frame;

pub use connection::{Connection, ReceiveFrameError, SendFrameError};
pub use data::{Protocol, Request, Response};
pub use frame::{Frame, ParseFrameError, WriteFrameError};
