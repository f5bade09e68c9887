mod clear;
mod init;
mod query;
mod set;

pub use clear::ClearService;
pub use init::InitService;
pub use query::QueryService;
pub use set::SetService;

use snafu::prelude::*;

use crate::client::app::connector::{ConnectError, Connector};
use crate::domain::client::outbound::{RequestDaemonError, UnavailableSnafu};
use crate::protocol::{Connection, Protocol, Request, Response};

/// Send one `request` over a fresh connection and wait for the reply.
async fn exchange(
    connector: &dyn Connector,
    request: Request,
) -> Result<Response, RequestDaemonError> {
    let stream = match connector.connect().await {
        Ok(stream) => stream,
        Err(ConnectError::Unavailable { endpoint }) => return UnavailableSnafu { endpoint }.fail(),
        Err(err) => return Err(err).whatever_context("Could not connect"),
    };

    let mut connection = Connection::from(stream);
    connection
        .send(Protocol::Request(request).into())
        .await
        .whatever_context("Could not send request")?;

    let frame = connection
        .receive()
        .await
        .whatever_context("Could not receive response")?;

    match Protocol::from(frame) {
        Protocol::Response(response) => Ok(response),
        Protocol::Request(request) => {
            whatever!("Daemon replied with a request: {request:?}")
        }
    }
}
