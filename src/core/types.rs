//! Core type definitions used throughout the codebase

/// Battle round counter (simulation time unit)
pub type Round = u64;

/// Wall-clock timestamp in milliseconds since the Unix epoch
pub type Millis = u64;

/// Health points; every unit starts at [`crate::battle::MAX_HEALTH`]
pub type Health = f64;
