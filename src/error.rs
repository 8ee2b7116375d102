// =====================================================================
// File: error.rs
//
// Description:
//   The single fallible surface of the buffered tree: construction-time
//   validation of `Options`. All other public operations (`put`, `get`,
//   `del`) are infallible by design.
// =====================================================================

/// Errors that can occur while configuring or constructing a [`Tree`](crate::Tree).
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("node_container_threshold must be at least 2, got {0}")]
    NodeThresholdTooSmall(usize),

    #[error("container_payload_threshold must be at least 1, got {0}")]
    ContainerThresholdTooSmall(usize),

    #[error("default_container_capacity must be at least 1, got {0}")]
    CapacityTooSmall(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
