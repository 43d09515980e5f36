#![forbid(unsafe_code)]

//! Lifeline daemon: hosts the trigger engine behind one dispatch queue and
//! runs the emergency action sequence against pluggable collaborators.

pub mod api;
pub mod collaborators;
pub mod config;
pub mod dispatcher;
pub mod platform;
pub mod sequencer;
pub mod store;
pub mod transport;
