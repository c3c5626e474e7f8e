//! Real-time merge layer: streaming ticks patch the live snapshot by symbol.

pub mod connection;
pub mod merger;
pub mod snapshot;

pub use connection::{ConnectionState, ConnectionTracker, StreamEvent};
pub use merger::{MessageStream, RealtimeMerger, ReconnectTimer, StreamConnector, TokioTimer};
pub use snapshot::{merge_ticks, LiveSnapshot};
