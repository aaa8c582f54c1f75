use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// A payload exactly as it arrived on some channel. The relay never looks inside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(data) => data.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("channel {0} is closed")]
    ChannelLost(ConnectionId),
    #[error("channel {0} fell behind and was evicted")]
    SlowConsumer(ConnectionId),
}

impl RelayError {
    pub fn connection(&self) -> ConnectionId {
        match self {
            RelayError::ChannelLost(id) | RelayError::SlowConsumer(id) => *id,
        }
    }
}

/// Outcome of a single fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    pub delivered: usize,
    pub evicted: Vec<RelayError>,
}

/// Registry of open channels, each fed through its own bounded queue.
pub struct Relay {
    peers: RwLock<HashMap<ConnectionId, mpsc::Sender<Frame>>>,
    queue_capacity: usize,
}

impl Relay {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Adds a channel. Joiners get nothing from before they connected.
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = Uuid::new_v4();
        self.peers.write().await.insert(id, tx);
        (id, rx)
    }

    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.peers.write().await.remove(&id).is_some()
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.peers.read().await.contains_key(&id)
    }

    /// Queues `frame` for every channel except `sender`.
    ///
    /// Never waits on a peer: a full queue evicts that peer, a closed one is
    /// dropped from the registry. Other peers are unaffected either way.
    pub async fn broadcast_except(&self, sender: ConnectionId, frame: Frame) -> FanOut {
        let mut fan_out = FanOut::default();
        {
            let peers = self.peers.read().await;
            for (id, tx) in peers.iter() {
                if *id == sender {
                    continue;
                }
                match tx.try_send(frame.clone()) {
                    Ok(()) => fan_out.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        fan_out.evicted.push(RelayError::SlowConsumer(*id));
                    }
                    Err(TrySendError::Closed(_)) => {
                        fan_out.evicted.push(RelayError::ChannelLost(*id));
                    }
                }
            }
        }

        if !fan_out.evicted.is_empty() {
            let mut peers = self.peers.write().await;
            for error in &fan_out.evicted {
                warn!(conn = %error.connection(), %error, "removing channel");
                peers.remove(&error.connection());
            }
        }

        debug!(
            conn = %sender,
            bytes = frame.len(),
            delivered = fan_out.delivered,
            "relayed frame"
        );
        fan_out
    }
}
