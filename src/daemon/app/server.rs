use std::sync::Arc;

use snafu::prelude::*;
use tracing::{field::Empty, Instrument, Span};

use crate::domain::daemon::inbound::QueryResponse;
use crate::domain::daemon::ApplicationCore;
use crate::protocol::connection::{ReceiveFrameError, SendFrameError};
use crate::protocol::{Connection, Protocol, Request, Response};
use crate::tracing_report;
use crate::utils::stream::Stream;

use super::listener::{ListenError, Listener};

/// Serves the local socket. A client opens one connection per request, so
/// each accepted stream is read once, answered once and dropped.
pub struct Server {
    listener: Box<dyn Listener>,
    core: Arc<ApplicationCore>,
}

impl Server {
    pub fn new(listener: Box<dyn Listener>, core: Arc<ApplicationCore>) -> Self {
        Self { listener, core }
    }

    /// Accept clients forever. Every connection is handled on its own task,
    /// a failing one is logged and does not affect the others.
    ///
    /// # Errors
    ///
    /// This function will return an error once the listener stops accepting.
    #[tracing::instrument(skip(self))]
    pub async fn serve(&self) -> Result<(), ServerError> {
        loop {
            let stream = self.listener.accept().await.context(ListenSnafu)?;
            tracing::debug!("Accepted connection");

            let core = Arc::clone(&self.core);
            let span = tracing::info_span!("handle", req = Empty).or_current();
            tokio::spawn(
                async move {
                    if let Err(err) = Self::handle(core, Connection::from(stream)).await {
                        tracing_report!(err, "Dropped connection");
                    }
                }
                .instrument(span),
            );
        }
    }

    async fn handle<S: Stream>(
        core: Arc<ApplicationCore>,
        mut connection: Connection<S>,
    ) -> Result<(), ServerError> {
        let frame = connection.receive().await.context(ReceiveSnafu)?;
        let Protocol::Request(request) = Protocol::from(frame) else {
            return UnexpectedResponseSnafu.fail();
        };

        Span::current().record("req", format!("{request:?}"));
        tracing::info!("Received request");

        let response = Self::dispatch(&core, request).await;
        connection
            .send(Protocol::Response(response).into())
            .await
            .context(SendSnafu)?;

        tracing::debug!("Sent response");
        Ok(())
    }

    async fn dispatch(core: &ApplicationCore, request: Request) -> Response {
        match request {
            Request::Set { start, end } => {
                core.set.set(start, end).await;
                Response::Set
            }
            Request::Clear => {
                core.clear.clear().await;
                Response::Clear
            }
            Request::Query => core.query.query().await.into(),
        }
    }
}

impl From<QueryResponse> for Response {
    fn from(snapshot: QueryResponse) -> Self {
        let QueryResponse {
            state,
            start,
            end,
            progress,
            remaining,
            label,
            blink,
            expired,
        } = snapshot;

        Response::Query {
            state,
            start,
            end,
            progress,
            remaining,
            label,
            blink,
            expired,
        }
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ServerError {
    #[snafu(display("Listener stopped accepting clients"))]
    Listen { source: ListenError },
    #[snafu(display("Could not read request"))]
    Receive { source: ReceiveFrameError },
    #[snafu(display("Client sent a response instead of a request"))]
    UnexpectedResponse,
    #[snafu(display("Could not write response"))]
    Send { source: SendFrameError },
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use tokio::io::DuplexStream;
    use tokio::time::Duration;

    use crate::daemon::app::listener::DuplexListener;
    use crate::domain::daemon::inbound::{MockClearPort, MockQueryPort, MockSetPort, MockStopPort};

    #[tokio::test]
    async fn server_handle_query() {
        let core = new_core(MockSetPort::new(), MockClearPort::new());
        let (connection, mut client) = new_connection_with(Protocol::Request(Request::Query)).await;
        assert!(Server::handle(core, connection).await.is_ok());
        assert_eq!(
            client.receive().await.unwrap(),
            Protocol::Response(Response::Query {
                state: "Running".to_owned(),
                start: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
                end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
                progress: 25.0,
                remaining: Duration::from_secs(5400),
                label: "1 h 30 min".to_owned(),
                blink: true,
                expired: false,
            })
            .into(),
        );
    }

    #[tokio::test]
    async fn server_handle_set() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let mut set = MockSetPort::new();
        set.expect_set()
            .withf(move |s, e| *s == start && *e == end)
            .times(1)
            .return_const(());
        let core = new_core(set, MockClearPort::new());

        let (connection, mut client) =
            new_connection_with(Protocol::Request(Request::Set { start, end })).await;
        assert!(Server::handle(core, connection).await.is_ok());
        assert_eq!(
            client.receive().await.unwrap(),
            Protocol::Response(Response::Set).into()
        );
    }

    #[tokio::test]
    async fn server_handle_clear() {
        let mut clear = MockClearPort::new();
        clear.expect_clear().times(1).return_const(());
        let core = new_core(MockSetPort::new(), clear);

        let (connection, mut client) = new_connection_with(Protocol::Request(Request::Clear)).await;
        assert!(Server::handle(core, connection).await.is_ok());
        assert_eq!(
            client.receive().await.unwrap(),
            Protocol::Response(Response::Clear).into()
        );
    }

    #[tokio::test]
    async fn server_handle_error_unexpected_response() {
        let core = new_core(MockSetPort::new(), MockClearPort::new());
        let (connection, _) = new_connection_with(Protocol::Response(Response::Clear)).await;
        assert!(matches!(
            Server::handle(core, connection).await,
            Err(ServerError::UnexpectedResponse),
        ))
    }

    #[tokio::test]
    async fn server_handle_error_send() {
        let mut clear = MockClearPort::new();
        clear.expect_clear().return_const(());
        let core = new_core(MockSetPort::new(), clear);
        let (connection, client) = new_connection_with(Protocol::Request(Request::Clear)).await;
        drop(client);
        assert!(matches!(
            Server::handle(core, connection).await,
            Err(ServerError::Send { .. }),
        ))
    }

    #[tokio::test]
    async fn server_serve_duplex() {
        let (listener, mut peers) = DuplexListener::new(1024);
        let server = Server::new(
            Box::new(listener),
            new_core(MockSetPort::new(), MockClearPort::new()),
        );
        tokio::spawn(async move { server.serve().await });

        let mut client = Connection::from(peers.recv().await.unwrap());
        client
            .send(Protocol::Request(Request::Query).into())
            .await
            .unwrap();
        assert!(matches!(
            Protocol::from(client.receive().await.unwrap()),
            Protocol::Response(Response::Query { .. })
        ));
    }

    fn new_core(set: MockSetPort, clear: MockClearPort) -> Arc<ApplicationCore> {
        let mut query = MockQueryPort::new();
        query.expect_query().returning(|| QueryResponse {
            state: "Running".to_owned(),
            start: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            progress: 25.0,
            remaining: Duration::from_secs(5400),
            label: "1 h 30 min".to_owned(),
            blink: true,
            expired: false,
        });

        let core = ApplicationCore {
            set: Arc::new(set),
            clear: Arc::new(clear),
            query: Arc::new(query),
            stop: Arc::new(MockStopPort::new()),
        };

        Arc::new(core)
    }

    async fn new_connection_with(
        data_recv: Protocol,
    ) -> (Connection<DuplexStream>, Connection<DuplexStream>) {
        let (server, client) = tokio::io::duplex(1024);
        let server = Connection::from(server);
        let mut client = Connection::from(client);
        client.send(data_recv.into()).await.unwrap();
        (server, client)
    }
}
