//! The adapter between stored preferences and the engine.
//!
//! Screens read and write preferences through this adapter; the engine only
//! ever sees the translated [`crate::engine::GuidanceConfig`]. Applying is
//! the single place engine guidance configuration is mutated, and applying
//! the same preference set twice pushes identical configurations.

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::Result;
use crate::preferences::store::PreferenceStore;
use crate::preferences::{keys, Preferences};
use crate::route::RouteOptions;

/// Key for the persisted privacy-policy acceptance flag.
///
/// Stored alongside the preference set but not part of it: the flag gates
/// first-time engine initialization and is never pushed to the engine.
const POLICY_ACCEPTED: &str = "POLICY_ACCEPTED";

/// Moves the preference set between persistent storage and the engine.
#[derive(Debug)]
pub struct PreferenceAdapter {
    store: Box<dyn PreferenceStore>,
}

impl PreferenceAdapter {
    /// Create an adapter over a preference store.
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load the current preference set.
    ///
    /// Never fails: missing or unparseable keys fall back per key, and a
    /// failing store degrades to the full defaults with a warning.
    #[must_use]
    pub fn load(&self) -> Preferences {
        match self.store.get_all(&keys::ALL) {
            Ok(entries) => Preferences::from_entries(&entries),
            Err(err) => {
                warn!("preference load failed, using defaults: {err}");
                Preferences::default()
            }
        }
    }

    /// Persist a preference set and push it to the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write or the engine call fails.
    pub fn save(&self, prefs: &Preferences, engine: &dyn Engine) -> Result<()> {
        self.store.set_all(&prefs.to_entries())?;
        debug!("preferences saved");
        engine.apply_guidance(&prefs.guidance_config())
    }

    /// Push the currently stored preference set to the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the configuration.
    pub fn apply(&self, engine: &dyn Engine) -> Result<()> {
        let prefs = self.load();
        engine.apply_guidance(&prefs.guidance_config())
    }

    /// Resolve the avoidance flags for the next route request from the
    /// currently stored preferences.
    #[must_use]
    pub fn route_options(&self) -> RouteOptions {
        self.load().route_options()
    }

    /// Whether the privacy policy has been accepted on this device.
    #[must_use]
    pub fn policy_accepted(&self) -> bool {
        match self.store.get(POLICY_ACCEPTED) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!("policy flag read failed, treating as not accepted: {err}");
                false
            }
        }
    }

    /// Persist the privacy-policy acceptance flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn set_policy_accepted(&self, accepted: bool) -> Result<()> {
        self.store.set(POLICY_ACCEPTED, if accepted { "true" } else { "false" })
    }
}
