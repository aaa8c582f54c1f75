use std::time::Duration;

/// Largest inbound frame a channel may send before it is dropped.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(60);
/// Pings go out at 9/10 of the pong timeout.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(54);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Largest inbound websocket message accepted, in bytes.
    pub max_message_size: usize,
    /// Frames buffered per peer before it is evicted as a slow consumer.
    pub queue_capacity: usize,
    pub ping_interval: Duration,
    /// A channel with no inbound traffic (pongs included) for this long is dropped.
    pub pong_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}
