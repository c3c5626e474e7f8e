//! Connection state machine for the streaming feed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Open,
    Message,
    Error(String),
    Close,
}

/// Tracks the tri-state connection signal. The state is observational only:
/// every close schedules a reconnect after the same fixed delay.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: ConnectionState,
    reconnect_delay: Duration,
    reconnects: u64,
}

impl ConnectionTracker {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Connecting,
            reconnect_delay,
            reconnects: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// A connection attempt is starting.
    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Apply an event; returns the delay before the next attempt on close.
    pub fn handle(&mut self, event: &StreamEvent) -> Option<Duration> {
        match event {
            StreamEvent::Open => {
                self.state = ConnectionState::Connected;
                None
            }
            StreamEvent::Message => None,
            StreamEvent::Error(_) => {
                self.state = ConnectionState::Disconnected;
                None
            }
            StreamEvent::Close => {
                self.state = ConnectionState::Disconnected;
                self.reconnects += 1;
                Some(self.reconnect_delay)
            }
        }
    }
}
