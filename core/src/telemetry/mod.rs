//! telemetry/mod.rs
//! Counters, stage timers and the immutable snapshot a pipeline run returns.
//!
//! Each stage owns its own counters and timings while it runs. They are
//! merged once every stage has joined, so no stage ever takes a lock or
//! touches an atomic to record progress.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
