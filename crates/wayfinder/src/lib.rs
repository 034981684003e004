//! `wayfinder` - Indoor navigation state for venue wayfinding apps
//!
//! This library provides the core functionality for driving turn-by-turn
//! indoor navigation against a pluggable positioning engine: route event
//! normalization, persistent user preferences, venue search and the
//! screen-facing view models, all tied together by a navigation session.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod bus;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod preferences;
pub mod route;
pub mod screens;
pub mod session;
pub mod units;
pub mod venue;

#[cfg(test)]
pub(crate) mod testutil;

pub use bus::{EventBus, Subscription};
pub use config::Config;
pub use engine::{Engine, EngineEvent};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use navigation::{NavigationState, RouteEventNormalizer};
pub use preferences::adapter::PreferenceAdapter;
pub use preferences::Preferences;
pub use session::{NavigationSession, SessionSnapshot};
