use std::sync::Arc;

use crate::domain::client::outbound::{ClearPort, InitPort, QueryPort, SetPort};

/// The client's view of the daemon: one port per command line operation.
pub struct ApplicationCore {
    pub init: Arc<dyn InitPort>,
    pub set: Arc<dyn SetPort>,
    pub clear: Arc<dyn ClearPort>,
    pub query: Arc<dyn QueryPort>,
}

impl ApplicationCore {
    pub fn setup(
        init: Arc<dyn InitPort>,
        set: Arc<dyn SetPort>,
        clear: Arc<dyn ClearPort>,
        query: Arc<dyn QueryPort>,
    ) -> Self {
        Self { init, set, clear, query }
    }
}
