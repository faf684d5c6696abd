//! Latest-Value Handoff
//!
//! Provides a lock-free single-slot cell: producers publish, the consumer
//! takes and clears. No backlog is kept; a newer value replaces an older
//! unconsumed one.

mod slot;

pub use slot::LatestSlot;
