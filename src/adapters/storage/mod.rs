//! Storage Adapters
//!
//! Implementations of the PendingStateStore port.
//!
//! ## Available Adapters
//!
//! - **CachePendingStore** - Stores pending questions as JSON in any `Cache`
//!   backend (in-memory or Redis)
//!
//! ## Usage
//!
//! ```ignore
//! use question_flow::adapters::cache::InMemoryCache;
//! use question_flow::adapters::storage::CachePendingStore;
//!
//! let store = CachePendingStore::new(Arc::new(InMemoryCache::new()))
//!     .with_ttl(Duration::from_secs(30 * 60));
//! ```

mod cache_pending_store;

pub use cache_pending_store::{CachePendingStore, DEFAULT_PENDING_PREFIX};
