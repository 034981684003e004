//! Distance unit conversion and display formatting.
//!
//! Distances arrive from the positioning engine in meters. Depending on the
//! user's unit preference they are rendered either as step counts (fixed
//! average step length) or as meters/kilometers with stage-based precision.
//! The same stage tables are pushed to the engine so its spoken guidance
//! matches what the screens display.

use serde::{Deserialize, Serialize};

/// Average step length used for meter/step conversion, in meters.
pub const STEP_LENGTH_M: f64 = 0.65;

/// Assumed walking speed for trip duration estimates, in meters per second.
pub const WALKING_SPEED_MPS: f64 = 1.4;

/// The user's preferred distance unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Metric distances (meters, kilometers for long distances).
    #[default]
    Meters,
    /// Step counts derived from the average step length.
    Steps,
}

impl DistanceUnit {
    /// Stable identifier used in persisted preferences.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Meters => "meters",
            Self::Steps => "steps",
        }
    }

    /// Parse a persisted identifier back into a unit.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "meters" => Some(Self::Meters),
            "steps" => Some(Self::Steps),
            _ => None,
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Display unit named by a conversion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitName {
    /// Whole steps.
    Steps,
    /// Meters.
    Meters,
    /// Kilometers.
    Kilometers,
}

impl UnitName {
    /// Word used when the rendered quantity is exactly one.
    #[must_use]
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Steps => "step",
            Self::Meters => "meter",
            Self::Kilometers => "kilometer",
        }
    }

    /// Word used for any other quantity.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::Meters => "meters",
            Self::Kilometers => "kilometers",
        }
    }
}

/// One stage of a unit conversion table.
///
/// A stage applies from `min_meters` upward until a later stage takes over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStage {
    /// Unit the stage renders in.
    pub unit: UnitName,
    /// Multiplier applied to a distance in meters.
    pub from_meters: f64,
    /// Smallest distance (in meters) the stage applies to.
    pub min_meters: f64,
    /// Decimal places in the rendered quantity.
    pub decimals: u8,
}

/// A staged unit conversion table, pushed to the engine as guidance
/// configuration and used locally by [`format_distance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    /// Stages ordered by ascending `min_meters`.
    pub stages: Vec<UnitStage>,
}

impl UnitConversion {
    /// Table for step-based display: a single stage over the whole range.
    #[must_use]
    pub fn steps() -> Self {
        Self {
            stages: vec![UnitStage {
                unit: UnitName::Steps,
                from_meters: 1.0 / STEP_LENGTH_M,
                min_meters: 0.0,
                decimals: 0,
            }],
        }
    }

    /// Table for metric display: meters below 1 km, kilometers with one
    /// decimal up to 2 km, whole kilometers beyond.
    #[must_use]
    pub fn meters() -> Self {
        Self {
            stages: vec![
                UnitStage {
                    unit: UnitName::Meters,
                    from_meters: 1.0,
                    min_meters: 0.0,
                    decimals: 0,
                },
                UnitStage {
                    unit: UnitName::Kilometers,
                    from_meters: 0.001,
                    min_meters: 1000.0,
                    decimals: 1,
                },
                UnitStage {
                    unit: UnitName::Kilometers,
                    from_meters: 0.001,
                    min_meters: 2000.0,
                    decimals: 0,
                },
            ],
        }
    }

    /// Table matching a unit preference.
    #[must_use]
    pub fn for_unit(unit: DistanceUnit) -> Self {
        match unit {
            DistanceUnit::Meters => Self::meters(),
            DistanceUnit::Steps => Self::steps(),
        }
    }

    /// The stage applying to a distance: the last stage whose `min_meters`
    /// threshold the distance reaches.
    #[must_use]
    pub fn stage_for(&self, meters: f64) -> &UnitStage {
        let mut selected = &self.stages[0];
        for stage in &self.stages {
            if meters >= stage.min_meters {
                selected = stage;
            }
        }
        selected
    }
}

/// Format a distance in meters for display in the preferred unit.
///
/// Rounding is half-away-from-zero at the stage's precision, so 2500 m
/// renders as "3 kilometers" rather than "2 kilometers".
///
/// # Examples
///
/// ```
/// use wayfinder::units::{format_distance, DistanceUnit};
///
/// assert_eq!(format_distance(950.0, DistanceUnit::Meters), "950 meters");
/// assert_eq!(format_distance(1500.0, DistanceUnit::Meters), "1.5 kilometers");
/// assert_eq!(format_distance(65.0, DistanceUnit::Steps), "100 steps");
/// ```
#[must_use]
pub fn format_distance(meters: f64, unit: DistanceUnit) -> String {
    format_with(&UnitConversion::for_unit(unit), meters)
}

/// Format a distance in meters using an explicit conversion table.
///
/// This is what an engine does with the table pushed to it: spoken guidance
/// and on-screen text go through the same stages.
#[must_use]
pub fn format_with(table: &UnitConversion, meters: f64) -> String {
    let stage = table.stage_for(meters);

    let scale = 10f64.powi(i32::from(stage.decimals));
    let value = (meters * stage.from_meters * scale).round() / scale;

    let quantity = format!("{value:.prec$}", prec = usize::from(stage.decimals));
    let word = if quantity == "1" {
        stage.unit.singular()
    } else {
        stage.unit.plural()
    };
    format!("{quantity} {word}")
}

/// Estimated walking time in whole minutes, never less than one.
#[must_use]
pub fn walk_minutes(meters: f64) -> u64 {
    let minutes = (meters / WALKING_SPEED_MPS / 60.0).round();
    if minutes < 1.0 {
        1
    } else {
        minutes as u64
    }
}

/// Number of steps covering a distance, rounded to the nearest step.
#[must_use]
pub fn steps_for(meters: f64) -> u64 {
    let steps = (meters / STEP_LENGTH_M).round();
    if steps < 0.0 {
        0
    } else {
        steps as u64
    }
}
