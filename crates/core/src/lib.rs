#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Trigger detection and debouncing engine for the lifeline safety trigger.
//!
//! Raw motion samples and volume-level changes go in; at most one accepted
//! emergency trigger per cooldown window comes out. Everything in this crate is
//! synchronous and takes time as an explicit millisecond argument, so the
//! daemon decides where the clock comes from and tests can drive it directly.

pub mod api;
pub mod arbiter;
pub mod engine;
pub mod error;
pub mod model;
pub mod motion;
pub mod shake;
pub mod tuning;
pub mod validation;
pub mod volume;

mod time;

pub use arbiter::{CooldownClock, TriggerArbiter, TriggerDecision};
pub use engine::{EngineSnapshot, TriggerEngine};
pub use error::ConfigError;
pub use model::*;
pub use time::{new_ulid, now_ms, EpochMs, MonoMs};
pub use tuning::TriggerTuning;
