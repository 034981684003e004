//! User preferences for routing and spoken guidance.
//!
//! Preferences are a flat record persisted as string key-value pairs. The
//! submodules provide the persistent store ([`store`]) and the adapter that
//! moves preferences between storage and the engine ([`adapter`]).
//!
//! Updates are immutable: setters consume the record and return a new one.

pub mod adapter;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::engine::GuidanceConfig;
use crate::error::{Error, Result};
use crate::route::RouteOptions;
use crate::units::{DistanceUnit, UnitConversion};

/// Persisted preference keys.
///
/// The spellings are stable storage identifiers; renaming one orphans the
/// value users have already saved.
pub mod keys {
    #![allow(missing_docs)]

    pub const AVOID_STAIRS: &str = "AVOID_STAIRS";
    pub const AVOID_ELEVATORS: &str = "AVOID_ELEVATORS";
    pub const AVOID_REVOLVING_DOORS: &str = "AVOID_REVOLVING_DOORS";
    pub const AVOID_NARROW_PATHS: &str = "AVOID_NARROW_PATHS";
    pub const DISTANCE_UNIT: &str = "DISTANCE_UNIT";
    pub const VOICE_GUIDANCE: &str = "VOICE_GUIDANCE";
    pub const HEADING_CORRECTION: &str = "VOICE_GUIDANCE_HEADING_CORRECTION";
    pub const DECISION_POINTS: &str = "VOICE_GUIDANCE_DECISION_POINTS";
    pub const HAZARDS: &str = "VOICE_GUIDANCE_HAZARDS";
    pub const LANDMARKS: &str = "VOICE_GUIDANCE_LANDMARKS";
    pub const SEGMENTS: &str = "VOICE_GUIDANCE_SEGMENTS";
    pub const REASSURANCE_ENABLED: &str = "VOICE_GUIDANCE_REASSURANCE_ENABLED";
    pub const REASSURANCE_DISTANCE: &str = "VOICE_GUIDANCE_REASSURANCE_DISTANCE";
    pub const ACCESSIBILITY_GUIDANCE: &str = "ACCESSIBILITY_GUIDANCE";

    /// Every preference key, in display order.
    pub const ALL: [&str; 14] = [
        AVOID_STAIRS,
        AVOID_ELEVATORS,
        AVOID_REVOLVING_DOORS,
        AVOID_NARROW_PATHS,
        DISTANCE_UNIT,
        VOICE_GUIDANCE,
        HEADING_CORRECTION,
        DECISION_POINTS,
        HAZARDS,
        LANDMARKS,
        SEGMENTS,
        REASSURANCE_ENABLED,
        REASSURANCE_DISTANCE,
        ACCESSIBILITY_GUIDANCE,
    ];
}

/// Extra guidance mode for accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityGuidance {
    /// Standard guidance.
    #[default]
    None,
    /// Richer spoken guidance for visually impaired users.
    VisuallyImpaired,
}

impl AccessibilityGuidance {
    /// Stable identifier used in persisted preferences.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::VisuallyImpaired => "visually_impaired",
        }
    }

    /// Parse a persisted identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "none" => Some(Self::None),
            "visually_impaired" => Some(Self::VisuallyImpaired),
            _ => None,
        }
    }

    /// Engine metadata keys unlocked by this mode.
    #[must_use]
    pub fn metadata_keys(&self) -> Vec<u32> {
        match self {
            Self::None => Vec::new(),
            Self::VisuallyImpaired => vec![1],
        }
    }
}

/// Distance between reassurance announcements.
///
/// Only these four intervals are offered in the preferences screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReassuranceDistance {
    /// Every 10 meters.
    M10,
    /// Every 15 meters.
    #[default]
    M15,
    /// Every 20 meters.
    M20,
    /// Every 25 meters.
    M25,
}

impl ReassuranceDistance {
    /// All selectable intervals, in ascending order.
    pub const OPTIONS: [Self; 4] = [Self::M10, Self::M15, Self::M20, Self::M25];

    /// The interval in meters.
    #[must_use]
    pub fn meters(&self) -> u32 {
        match self {
            Self::M10 => 10,
            Self::M15 => 15,
            Self::M20 => 20,
            Self::M25 => 25,
        }
    }

    /// Parse a meter count back into an interval.
    #[must_use]
    pub fn from_meters(meters: u32) -> Option<Self> {
        match meters {
            10 => Some(Self::M10),
            15 => Some(Self::M15),
            20 => Some(Self::M20),
            25 => Some(Self::M25),
            _ => None,
        }
    }
}

/// The user's routing and guidance preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Never route over stairs.
    pub avoid_stairs: bool,
    /// Never route through elevators.
    pub avoid_elevators: bool,
    /// Never route through revolving doors.
    pub avoid_revolving_doors: bool,
    /// Never route through narrow paths.
    pub avoid_narrow_paths: bool,
    /// Unit used when displaying and speaking distances.
    pub distance_unit: DistanceUnit,
    /// Master switch for spoken guidance.
    pub voice_guidance: bool,
    /// Speak heading corrections.
    pub heading_correction: bool,
    /// Announce upcoming decision points.
    pub decision_points: bool,
    /// Announce nearby hazards.
    pub hazards: bool,
    /// Announce nearby landmarks.
    pub landmarks: bool,
    /// Announce entering named areas.
    pub segments: bool,
    /// Periodically confirm route progress.
    pub reassurance_enabled: bool,
    /// Distance between reassurance announcements.
    pub reassurance_distance: ReassuranceDistance,
    /// Accessibility guidance mode.
    pub accessibility_guidance: AccessibilityGuidance,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            avoid_stairs: false,
            avoid_elevators: false,
            avoid_revolving_doors: false,
            avoid_narrow_paths: false,
            distance_unit: DistanceUnit::Meters,
            voice_guidance: true,
            heading_correction: true,
            decision_points: false,
            hazards: false,
            landmarks: false,
            segments: true,
            reassurance_enabled: true,
            reassurance_distance: ReassuranceDistance::M15,
            accessibility_guidance: AccessibilityGuidance::None,
        }
    }
}

impl Preferences {
    /// Set the avoid-stairs flag.
    ///
    /// Stairs and elevators cannot both be avoided: freshly enabling this
    /// flag clears `avoid_elevators` in the same update.
    #[must_use]
    pub fn set_avoid_stairs(self, enabled: bool) -> Self {
        let avoid_elevators = if enabled { false } else { self.avoid_elevators };
        Self {
            avoid_stairs: enabled,
            avoid_elevators,
            ..self
        }
    }

    /// Set the avoid-elevators flag, clearing `avoid_stairs` when freshly
    /// enabled.
    #[must_use]
    pub fn set_avoid_elevators(self, enabled: bool) -> Self {
        let avoid_stairs = if enabled { false } else { self.avoid_stairs };
        Self {
            avoid_elevators: enabled,
            avoid_stairs,
            ..self
        }
    }

    /// Build preferences from persisted entries.
    ///
    /// Every missing or unparseable value falls back to its default; a
    /// half-written store never blocks startup.
    #[must_use]
    pub fn from_entries(entries: &std::collections::HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| entries.get(key).map(String::as_str);

        Self {
            avoid_stairs: parse_bool(get(keys::AVOID_STAIRS), defaults.avoid_stairs),
            avoid_elevators: parse_bool(get(keys::AVOID_ELEVATORS), defaults.avoid_elevators),
            avoid_revolving_doors: parse_bool(
                get(keys::AVOID_REVOLVING_DOORS),
                defaults.avoid_revolving_doors,
            ),
            avoid_narrow_paths: parse_bool(
                get(keys::AVOID_NARROW_PATHS),
                defaults.avoid_narrow_paths,
            ),
            distance_unit: get(keys::DISTANCE_UNIT)
                .and_then(DistanceUnit::from_id)
                .unwrap_or(defaults.distance_unit),
            voice_guidance: parse_bool(get(keys::VOICE_GUIDANCE), defaults.voice_guidance),
            heading_correction: parse_bool(
                get(keys::HEADING_CORRECTION),
                defaults.heading_correction,
            ),
            decision_points: parse_bool(get(keys::DECISION_POINTS), defaults.decision_points),
            hazards: parse_bool(get(keys::HAZARDS), defaults.hazards),
            landmarks: parse_bool(get(keys::LANDMARKS), defaults.landmarks),
            segments: parse_bool(get(keys::SEGMENTS), defaults.segments),
            reassurance_enabled: parse_bool(
                get(keys::REASSURANCE_ENABLED),
                defaults.reassurance_enabled,
            ),
            reassurance_distance: get(keys::REASSURANCE_DISTANCE)
                .and_then(|v| v.parse().ok())
                .and_then(ReassuranceDistance::from_meters)
                .unwrap_or(defaults.reassurance_distance),
            accessibility_guidance: get(keys::ACCESSIBILITY_GUIDANCE)
                .and_then(AccessibilityGuidance::from_id)
                .unwrap_or(defaults.accessibility_guidance),
        }
    }

    /// Serialize all preferences into persistable entries.
    #[must_use]
    pub fn to_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::AVOID_STAIRS, self.avoid_stairs.to_string()),
            (keys::AVOID_ELEVATORS, self.avoid_elevators.to_string()),
            (
                keys::AVOID_REVOLVING_DOORS,
                self.avoid_revolving_doors.to_string(),
            ),
            (
                keys::AVOID_NARROW_PATHS,
                self.avoid_narrow_paths.to_string(),
            ),
            (keys::DISTANCE_UNIT, self.distance_unit.id().to_string()),
            (keys::VOICE_GUIDANCE, self.voice_guidance.to_string()),
            (
                keys::HEADING_CORRECTION,
                self.heading_correction.to_string(),
            ),
            (keys::DECISION_POINTS, self.decision_points.to_string()),
            (keys::HAZARDS, self.hazards.to_string()),
            (keys::LANDMARKS, self.landmarks.to_string()),
            (keys::SEGMENTS, self.segments.to_string()),
            (
                keys::REASSURANCE_ENABLED,
                self.reassurance_enabled.to_string(),
            ),
            (
                keys::REASSURANCE_DISTANCE,
                self.reassurance_distance.meters().to_string(),
            ),
            (
                keys::ACCESSIBILITY_GUIDANCE,
                self.accessibility_guidance.id().to_string(),
            ),
        ]
    }

    /// Apply one persisted-format entry, returning the updated record.
    ///
    /// The avoid-stairs/avoid-elevators exclusion rule runs for the two
    /// avoidance keys, exactly as if the matching screen toggle was used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPreferenceKey`] for a key outside
    /// [`keys::ALL`] and [`Error::InvalidPreferenceValue`] when the value
    /// does not parse for its key.
    pub fn with_entry(self, key: &str, value: &str) -> Result<Self> {
        let parse_flag = |value: &str| -> Result<bool> {
            match value {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::invalid_preference(key, value)),
            }
        };

        match key {
            keys::AVOID_STAIRS => Ok(self.set_avoid_stairs(parse_flag(value)?)),
            keys::AVOID_ELEVATORS => Ok(self.set_avoid_elevators(parse_flag(value)?)),
            keys::AVOID_REVOLVING_DOORS => Ok(Self {
                avoid_revolving_doors: parse_flag(value)?,
                ..self
            }),
            keys::AVOID_NARROW_PATHS => Ok(Self {
                avoid_narrow_paths: parse_flag(value)?,
                ..self
            }),
            keys::DISTANCE_UNIT => DistanceUnit::from_id(value)
                .map(|distance_unit| Self {
                    distance_unit,
                    ..self
                })
                .ok_or_else(|| Error::invalid_preference(key, value)),
            keys::VOICE_GUIDANCE => Ok(Self {
                voice_guidance: parse_flag(value)?,
                ..self
            }),
            keys::HEADING_CORRECTION => Ok(Self {
                heading_correction: parse_flag(value)?,
                ..self
            }),
            keys::DECISION_POINTS => Ok(Self {
                decision_points: parse_flag(value)?,
                ..self
            }),
            keys::HAZARDS => Ok(Self {
                hazards: parse_flag(value)?,
                ..self
            }),
            keys::LANDMARKS => Ok(Self {
                landmarks: parse_flag(value)?,
                ..self
            }),
            keys::SEGMENTS => Ok(Self {
                segments: parse_flag(value)?,
                ..self
            }),
            keys::REASSURANCE_ENABLED => Ok(Self {
                reassurance_enabled: parse_flag(value)?,
                ..self
            }),
            keys::REASSURANCE_DISTANCE => value
                .parse()
                .ok()
                .and_then(ReassuranceDistance::from_meters)
                .map(|reassurance_distance| Self {
                    reassurance_distance,
                    ..self
                })
                .ok_or_else(|| Error::invalid_preference(key, value)),
            keys::ACCESSIBILITY_GUIDANCE => AccessibilityGuidance::from_id(value)
                .map(|accessibility_guidance| Self {
                    accessibility_guidance,
                    ..self
                })
                .ok_or_else(|| Error::invalid_preference(key, value)),
            _ => Err(Error::UnknownPreferenceKey {
                key: key.to_string(),
            }),
        }
    }

    /// Translate into the engine's spoken-guidance configuration.
    ///
    /// Pure translation, no engine calls; equal preference sets yield equal
    /// configurations.
    #[must_use]
    pub fn guidance_config(&self) -> GuidanceConfig {
        GuidanceConfig {
            tts_enabled: self.voice_guidance,
            heading_correction: self.heading_correction,
            decision_point_alerts: self.decision_points,
            hazard_alerts: self.hazards,
            landmark_alerts: self.landmarks,
            segment_alerts: self.segments,
            reassurance_enabled: self.reassurance_enabled,
            reassurance_distance_m: self.reassurance_distance.meters(),
            accessibility_metadata_keys: self.accessibility_guidance.metadata_keys(),
            unit_table: UnitConversion::for_unit(self.distance_unit),
        }
    }

    /// Resolve the avoidance flags for the next route request.
    #[must_use]
    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            avoid_stairs: self.avoid_stairs,
            avoid_elevators: self.avoid_elevators,
            avoid_revolving_doors: self.avoid_revolving_doors,
            avoid_narrow_paths: self.avoid_narrow_paths,
            ..RouteOptions::default()
        }
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert!(!prefs.avoid_stairs);
        assert!(!prefs.avoid_elevators);
        assert!(!prefs.avoid_revolving_doors);
        assert!(!prefs.avoid_narrow_paths);
        assert_eq!(prefs.distance_unit, DistanceUnit::Meters);
        assert!(prefs.voice_guidance);
        assert!(prefs.heading_correction);
        assert!(!prefs.decision_points);
        assert!(!prefs.hazards);
        assert!(!prefs.landmarks);
        assert!(prefs.segments);
        assert!(prefs.reassurance_enabled);
        assert_eq!(prefs.reassurance_distance, ReassuranceDistance::M15);
        assert_eq!(prefs.accessibility_guidance, AccessibilityGuidance::None);
    }

    #[test]
    fn test_avoid_stairs_clears_elevators() {
        let prefs = Preferences {
            avoid_elevators: true,
            ..Preferences::default()
        };
        let updated = prefs.set_avoid_stairs(true);
        assert!(updated.avoid_stairs);
        assert!(!updated.avoid_elevators);
    }

    #[test]
    fn test_avoid_elevators_clears_stairs() {
        let prefs = Preferences {
            avoid_stairs: true,
            ..Preferences::default()
        };
        let updated = prefs.set_avoid_elevators(true);
        assert!(updated.avoid_elevators);
        assert!(!updated.avoid_stairs);
    }

    #[test]
    fn test_disabling_avoidance_leaves_other_flag() {
        let prefs = Preferences {
            avoid_elevators: true,
            ..Preferences::default()
        };
        let updated = prefs.set_avoid_stairs(false);
        assert!(!updated.avoid_stairs);
        assert!(updated.avoid_elevators);
    }

    #[test]
    fn test_from_entries_empty_gives_defaults() {
        let prefs = Preferences::from_entries(&HashMap::new());
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_from_entries_partial() {
        let mut entries = HashMap::new();
        entries.insert(keys::AVOID_STAIRS.to_string(), "true".to_string());
        entries.insert(keys::DISTANCE_UNIT.to_string(), "steps".to_string());

        let prefs = Preferences::from_entries(&entries);
        assert!(prefs.avoid_stairs);
        assert_eq!(prefs.distance_unit, DistanceUnit::Steps);
        // Untouched keys keep their defaults.
        assert!(prefs.voice_guidance);
    }

    #[test]
    fn test_from_entries_garbage_falls_back_per_key() {
        let mut entries = HashMap::new();
        entries.insert(keys::VOICE_GUIDANCE.to_string(), "maybe".to_string());
        entries.insert(keys::DISTANCE_UNIT.to_string(), "furlongs".to_string());
        entries.insert(
            keys::REASSURANCE_DISTANCE.to_string(),
            "17".to_string(),
        );
        entries.insert(keys::HAZARDS.to_string(), "true".to_string());

        let prefs = Preferences::from_entries(&entries);
        assert!(prefs.voice_guidance);
        assert_eq!(prefs.distance_unit, DistanceUnit::Meters);
        assert_eq!(prefs.reassurance_distance, ReassuranceDistance::M15);
        // The parseable key still takes effect.
        assert!(prefs.hazards);
    }

    #[test]
    fn test_entries_roundtrip() {
        let prefs = Preferences {
            avoid_narrow_paths: true,
            distance_unit: DistanceUnit::Steps,
            reassurance_distance: ReassuranceDistance::M25,
            accessibility_guidance: AccessibilityGuidance::VisuallyImpaired,
            ..Preferences::default()
        };

        let entries: HashMap<String, String> = prefs
            .to_entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(entries.len(), keys::ALL.len());
        assert_eq!(Preferences::from_entries(&entries), prefs);
    }

    #[test]
    fn test_with_entry_applies_exclusion_rule() {
        let prefs = Preferences {
            avoid_elevators: true,
            ..Preferences::default()
        };
        let updated = prefs.with_entry(keys::AVOID_STAIRS, "true").unwrap();
        assert!(updated.avoid_stairs);
        assert!(!updated.avoid_elevators);
    }

    #[test]
    fn test_with_entry_unknown_key() {
        let err = Preferences::default()
            .with_entry("NO_SUCH_KEY", "true")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownPreferenceKey { .. }));
    }

    #[test]
    fn test_with_entry_invalid_value() {
        let err = Preferences::default()
            .with_entry(keys::VOICE_GUIDANCE, "yes")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPreferenceValue { .. }));

        let err = Preferences::default()
            .with_entry(keys::REASSURANCE_DISTANCE, "12")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPreferenceValue { .. }));
    }

    #[test]
    fn test_with_entry_enum_values() {
        let prefs = Preferences::default()
            .with_entry(keys::ACCESSIBILITY_GUIDANCE, "visually_impaired")
            .unwrap()
            .with_entry(keys::REASSURANCE_DISTANCE, "20")
            .unwrap();
        assert_eq!(
            prefs.accessibility_guidance,
            AccessibilityGuidance::VisuallyImpaired
        );
        assert_eq!(prefs.reassurance_distance, ReassuranceDistance::M20);
    }

    #[test]
    fn test_guidance_config_translation() {
        let prefs = Preferences {
            voice_guidance: false,
            hazards: true,
            reassurance_distance: ReassuranceDistance::M20,
            distance_unit: DistanceUnit::Steps,
            ..Preferences::default()
        };

        let config = prefs.guidance_config();
        assert!(!config.tts_enabled);
        assert!(config.hazard_alerts);
        assert_eq!(config.reassurance_distance_m, 20);
        assert_eq!(config.unit_table, UnitConversion::steps());
        assert!(config.accessibility_metadata_keys.is_empty());
    }

    #[test]
    fn test_guidance_config_accessibility_metadata() {
        let prefs = Preferences {
            accessibility_guidance: AccessibilityGuidance::VisuallyImpaired,
            ..Preferences::default()
        };
        assert_eq!(prefs.guidance_config().accessibility_metadata_keys, vec![1]);
    }

    #[test]
    fn test_route_options_from_preferences() {
        let prefs = Preferences {
            avoid_stairs: true,
            avoid_narrow_paths: true,
            ..Preferences::default()
        };
        let options = prefs.route_options();
        assert!(options.avoid_stairs);
        assert!(!options.avoid_elevators);
        assert!(options.avoid_narrow_paths);
        assert!(!options.avoid_revolving_doors);
        assert!((options.path_fix_distance_m - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reassurance_distance_options() {
        assert_eq!(ReassuranceDistance::OPTIONS.len(), 4);
        assert_eq!(ReassuranceDistance::M10.meters(), 10);
        assert_eq!(ReassuranceDistance::from_meters(25), Some(ReassuranceDistance::M25));
        assert_eq!(ReassuranceDistance::from_meters(30), None);
    }

    #[test]
    fn test_accessibility_guidance_ids() {
        assert_eq!(AccessibilityGuidance::None.id(), "none");
        assert_eq!(
            AccessibilityGuidance::from_id("visually_impaired"),
            Some(AccessibilityGuidance::VisuallyImpaired)
        );
        assert_eq!(AccessibilityGuidance::from_id("bogus"), None);
    }
}
