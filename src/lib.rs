//! # buftree
//! An in-memory, ordered key/value index built around a buffered
//! search tree: writes accumulate at the root and migrate downward
//! lazily, amortizing the cost of keeping the tree ordered.
//!
//! ## Features
//! - Point `put`/`get`/`del` under a caller-supplied key comparator
//! - Lazy, amortized downward migration of buffered writes
//! - Optional key/value destructor hooks, invoked on release
//! - Arena-backed nodes and payloads (see [`Tree`] internals) so a whole
//!   tree can be torn down without a recursive free-walk
//!
//! This crate does not persist anything to disk and is not thread-safe;
//! see `SPEC_FULL.md` §5 for the concurrency and resource model.

pub mod comparator;
pub mod container;
pub mod error;
pub mod node;
pub mod payload;
pub mod tree;

pub use comparator::Comparator;
pub use error::{Error, Result};
pub use payload::Op;
pub use tree::{Options, Tree};
