use std::sync::Arc;

use crate::config::RelayConfig;
use crate::relay::Relay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            relay: Arc::new(Relay::new(config.queue_capacity)),
            config: Arc::new(config),
        }
    }
}
