//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation engine and the outside world. Adapters implement these
//! ports.
//!
//! - `Cache` - Namespaced key/value storage with expiry
//! - `PendingStateStore` - Read-once storage of pending questions per session
//! - `MessageTransport` - Outgoing messages to the chat platform

mod cache;
mod pending_store;
mod transport;

pub use cache::{Cache, CacheError};
pub use pending_store::{PendingStateStore, PendingStoreError};
pub use transport::{MessageTransport, TransportError};
