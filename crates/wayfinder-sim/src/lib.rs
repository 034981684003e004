//! `wayfinder-sim` - Simulated positioning engine for wayfinder
//!
//! A deterministic, in-process implementation of the engine contract: a
//! small multi-floor demo venue, straight-line route synthesis with
//! stairs/elevator hops, and timed guidance playback over the event bus.
//! Sessions, tests, and the CLI drive it exactly like a production
//! positioning engine, without hardware or network access.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod engine;
mod playback;
pub mod venue;

pub use engine::{SimConfig, SimEngine};
pub use venue::{Connector, ConnectorKind, SimVenue, COVERAGE_GEOFENCE_ID};
