use std::sync::Arc;

use super::exchange;
use crate::client::app::connector::Connector;
use crate::domain::client::outbound::{BadResponseSnafu, QueryPort, QueryResponse, RequestDaemonError};
use crate::protocol::{Request, Response};

/// Fetches the countdown snapshot from the daemon.
pub struct QueryService {
    connector: Arc<dyn Connector>,
}

impl QueryService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    async fn query(&self) -> Result<QueryResponse, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Query).await? {
            Response::Query {
                state,
                start,
                end,
                progress,
                remaining,
                label,
                blink,
                expired,
            } => Ok(QueryResponse {
                state,
                start,
                end,
                progress,
                remaining,
                label,
                blink,
                expired,
            }),
            _ => BadResponseSnafu.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use tokio::time::Duration;

    use crate::client::app::connector::DuplexConnector;
    use crate::client::outbound::testing::reply_once;

    #[tokio::test]
    async fn query_service_run() {
        let (connector, server) = DuplexConnector::new(512);
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        tokio::spawn(reply_once(
            server,
            Request::Query,
            Response::Query {
                state: "Running".to_owned(),
                start: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
                end: Some(end),
                progress: 75.0,
                remaining: Duration::from_secs(1800),
                label: "30 min".to_owned(),
                blink: true,
                expired: false,
            },
        ));

        let service = QueryService::new(Arc::new(connector));
        let response = service.query().await.unwrap();
        assert_eq!(response.state, "Running");
        assert_eq!(response.end, Some(end));
        assert_eq!(response.progress, 75.0);
        assert_eq!(response.remaining.as_secs(), 1800);
        assert_eq!(response.label, "30 min");
        assert!(response.blink);
    }

    #[tokio::test]
    async fn query_service_error_unavailable() {
        let (connector, server) = DuplexConnector::new(256);
        drop(server);

        let service = QueryService::new(Arc::new(connector));
        assert!(matches!(
            service.query().await,
            Err(RequestDaemonError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn query_service_error_bad_response() {
        let (connector, server) = DuplexConnector::new(256);
        tokio::spawn(reply_once(server, Request::Query, Response::Clear));

        let service = QueryService::new(Arc::new(connector));
        assert!(matches!(
            service.query().await,
            Err(RequestDaemonError::BadResponse)
        ));
    }
}
