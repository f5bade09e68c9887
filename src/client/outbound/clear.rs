use std::sync::Arc;

use super::exchange;
use crate::client::app::connector::Connector;
use crate::domain::client::outbound::{BadResponseSnafu, ClearPort, RequestDaemonError};
use crate::protocol::{Request, Response};

/// Asks the daemon to drop the countdown.
pub struct ClearService {
    connector: Arc<dyn Connector>,
}

impl ClearService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl ClearPort for ClearService {
    async fn clear(&self) -> Result<(), RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Clear).await? {
            Response::Clear => Ok(()),
            _ => BadResponseSnafu.fail(),
        }
    }
}
