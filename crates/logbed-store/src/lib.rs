//! Store seam for logbed.
//!
//! Everything above this crate sees one trait, [`LogStore`]: exact-match
//! `put` and an in-partition sort-key range query. The DynamoDB backend is
//! the production implementation; the in-memory backend exists for tests
//! and mirrors the same semantics, including lexicographic sort-key
//! comparison.

pub mod dynamo;
pub mod error;
pub mod memory;
pub mod store;
pub mod timeout;

pub use dynamo::DynamoLogStore;
pub use error::{Result, StoreError};
pub use memory::MemoryLogStore;
pub use store::{LogStore, SortKeyRange};
pub use timeout::TimeoutStore;
