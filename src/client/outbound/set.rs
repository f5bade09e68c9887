use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::exchange;
use crate::client::app::connector::Connector;
use crate::domain::client::outbound::{BadResponseSnafu, RequestDaemonError, SetPort};
use crate::protocol::{Request, Response};

/// Sends a new countdown interval to the daemon.
pub struct SetService {
    connector: Arc<dyn Connector>,
}

impl SetService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl SetPort for SetService {
    async fn set(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Set { start, end }).await? {
            Response::Set => Ok(()),
            _ => BadResponseSnafu.fail(),
        }
    }
}
