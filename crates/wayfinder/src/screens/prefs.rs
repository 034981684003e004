//! Preferences screen model.
//!
//! The screen edits a draft copy of the stored preference set and flushes it
//! in one shot when it closes; nothing is persisted or pushed to the engine
//! while the user is still toggling switches.

use crate::engine::Engine;
use crate::error::Result;
use crate::preferences::adapter::PreferenceAdapter;
use crate::preferences::{AccessibilityGuidance, Preferences, ReassuranceDistance};
use crate::units::DistanceUnit;

/// Draft editor over the stored preference set.
///
/// Voice-guidance detail toggles are inert while the master switch is off,
/// matching the disabled switches on the screen.
#[derive(Debug, Clone)]
pub struct PreferenceEditor {
    draft: Preferences,
}

impl PreferenceEditor {
    /// Open the editor on the currently stored preferences.
    #[must_use]
    pub fn open(adapter: &PreferenceAdapter) -> Self {
        Self {
            draft: adapter.load(),
        }
    }

    /// Start from an explicit preference set.
    #[must_use]
    pub fn with_draft(draft: Preferences) -> Self {
        Self { draft }
    }

    /// The draft being edited.
    #[must_use]
    pub fn draft(&self) -> &Preferences {
        &self.draft
    }

    /// Whether the voice-guidance detail rows are editable.
    #[must_use]
    pub fn can_edit_voice_details(&self) -> bool {
        self.draft.voice_guidance
    }

    /// Toggle stair avoidance. Enabling clears elevator avoidance.
    pub fn set_avoid_stairs(&mut self, enabled: bool) {
        self.draft = self.draft.clone().set_avoid_stairs(enabled);
    }

    /// Toggle elevator avoidance. Enabling clears stair avoidance.
    pub fn set_avoid_elevators(&mut self, enabled: bool) {
        self.draft = self.draft.clone().set_avoid_elevators(enabled);
    }

    /// Toggle revolving-door avoidance.
    pub fn set_avoid_revolving_doors(&mut self, enabled: bool) {
        self.draft = Preferences {
            avoid_revolving_doors: enabled,
            ..self.draft.clone()
        };
    }

    /// Toggle narrow-path avoidance.
    pub fn set_avoid_narrow_paths(&mut self, enabled: bool) {
        self.draft = Preferences {
            avoid_narrow_paths: enabled,
            ..self.draft.clone()
        };
    }

    /// Pick the displayed distance unit.
    pub fn set_distance_unit(&mut self, unit: DistanceUnit) {
        self.draft = Preferences {
            distance_unit: unit,
            ..self.draft.clone()
        };
    }

    /// Flip the voice-guidance master switch.
    pub fn set_voice_guidance(&mut self, enabled: bool) {
        self.draft = Preferences {
            voice_guidance: enabled,
            ..self.draft.clone()
        };
    }

    /// Toggle spoken heading corrections. Inert while voice guidance is off.
    pub fn set_heading_correction(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                heading_correction: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Toggle decision-point announcements. Inert while voice guidance is off.
    pub fn set_decision_points(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                decision_points: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Toggle hazard announcements. Inert while voice guidance is off.
    pub fn set_hazards(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                hazards: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Toggle landmark announcements. Inert while voice guidance is off.
    pub fn set_landmarks(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                landmarks: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Toggle named-area announcements. Inert while voice guidance is off.
    pub fn set_segments(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                segments: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Toggle reassurance announcements. Inert while voice guidance is off.
    pub fn set_reassurance_enabled(&mut self, enabled: bool) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                reassurance_enabled: enabled,
                ..self.draft.clone()
            };
        }
    }

    /// Pick the reassurance interval. Inert while voice guidance is off.
    pub fn set_reassurance_distance(&mut self, distance: ReassuranceDistance) {
        if self.draft.voice_guidance {
            self.draft = Preferences {
                reassurance_distance: distance,
                ..self.draft.clone()
            };
        }
    }

    /// Pick the accessibility guidance mode.
    pub fn set_accessibility_guidance(&mut self, guidance: AccessibilityGuidance) {
        self.draft = Preferences {
            accessibility_guidance: guidance,
            ..self.draft.clone()
        };
    }

    /// Close the screen: persist the draft and push it to the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write or the engine call fails.
    pub fn close(self, adapter: &PreferenceAdapter, engine: &dyn Engine) -> Result<()> {
        adapter.save(&self.draft, engine)
    }
}
