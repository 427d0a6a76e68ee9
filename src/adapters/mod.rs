//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the conversation engine to external systems:
//! - `cache` - Cache backends (in-memory, Redis)
//! - `storage` - Pending question storage on top of a cache
//! - `transport` - Outgoing message transports (recording)

pub mod cache;
pub mod storage;
pub mod transport;

pub use cache::{InMemoryCache, RedisCache};
pub use storage::CachePendingStore;
pub use transport::{RecordingTransport, SentMessage};
