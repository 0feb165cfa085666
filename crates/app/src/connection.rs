//! Event stream connection state machine.
//!
//! ```text
//! Disconnected ─Connect─▶ Connecting ─Open─▶ Open ─End─▶ Connecting
//!                           ▲     │            │
//!                   Connect │     │ Fail       │ Fail
//!                           │     ▼            │
//!                           └─── Error ◀───────┘
//! ```
//!
//! `Shutdown` moves any state to `Disconnected`. A transition yields the
//! notification to publish when it enters `Open` or `Error`, or when a
//! shutdown leaves a live connection.

use std::fmt;

use crate::ports::SyncNotification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A connection attempt starts.
    Connect,
    /// The stream is established.
    Open,
    /// The attempt or the established stream failed.
    Fail(String),
    /// The hub closed the stream cleanly.
    End,
    /// The driver is stopping.
    Shutdown,
}

#[derive(Debug, Default)]
pub struct ConnectionMachine {
    state: ConnectionState,
}

impl ConnectionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply `event`, returning the notification the transition produces.
    ///
    /// Events that make no sense in the current state leave it unchanged.
    pub fn handle(&mut self, event: ConnectionEvent) -> Option<SyncNotification> {
        use ConnectionEvent as E;
        use ConnectionState as S;

        let (next, notification) = match (self.state, event) {
            (S::Disconnected | S::Error | S::Connecting, E::Connect) => (S::Connecting, None),
            (S::Connecting, E::Open) => (S::Open, Some(SyncNotification::Connected)),
            (S::Connecting | S::Open, E::Fail(message)) => {
                (S::Error, Some(SyncNotification::ConnectionError { message }))
            }
            (S::Open, E::End) => (S::Connecting, None),
            (S::Disconnected, E::Shutdown) => (S::Disconnected, None),
            (_, E::Shutdown) => (S::Disconnected, Some(SyncNotification::Disconnected)),
            (state, event) => {
                tracing::debug!(%state, ?event, "ignoring connection event");
                (state, None)
            }
        };
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, "connection state changed");
        }
        self.state = next;
        notification
    }
}
