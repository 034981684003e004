//! Route model and routing-engine event descriptors.
//!
//! The engine computes routes; this module defines what a computed route
//! looks like to the rest of the crate, the closed set of route-update
//! events the engine emits while guiding, and the request/options payload
//! sent when asking for a route.

use serde::{Deserialize, Serialize};

use crate::units::{self, DistanceUnit};
use crate::venue::{Feature, Position};

/// Default distance, in meters, within which the engine may snap a route's
/// start onto the path network.
pub const DEFAULT_PATH_FIX_DISTANCE_M: f64 = 2.0;

/// Maneuver symbol attached to a route step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum StepDirection {
    Start,
    TurnAround,
    HardLeft,
    Left,
    SlightLeft,
    Straight,
    SlightRight,
    Right,
    HardRight,
    UpElevator,
    UpEscalator,
    UpStairs,
    DownElevator,
    DownEscalator,
    DownStairs,
    Finish,
}

impl StepDirection {
    /// Whether the maneuver uses stairs.
    #[must_use]
    pub fn is_stairs(&self) -> bool {
        matches!(self, Self::UpStairs | Self::DownStairs)
    }

    /// Whether the maneuver uses an elevator.
    #[must_use]
    pub fn is_elevator(&self) -> bool {
        matches!(self, Self::UpElevator | Self::DownElevator)
    }

    /// Whether the maneuver moves between levels.
    #[must_use]
    pub fn is_level_change(&self) -> bool {
        matches!(
            self,
            Self::UpElevator
                | Self::UpEscalator
                | Self::UpStairs
                | Self::DownElevator
                | Self::DownEscalator
                | Self::DownStairs
        )
    }
}

impl std::fmt::Display for StepDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Start => "start",
            Self::TurnAround => "turn around",
            Self::HardLeft => "turn sharply left",
            Self::Left => "turn left",
            Self::SlightLeft => "bear left",
            Self::Straight => "continue straight",
            Self::SlightRight => "bear right",
            Self::Right => "turn right",
            Self::HardRight => "turn sharply right",
            Self::UpElevator => "take the elevator up",
            Self::UpEscalator => "take the escalator up",
            Self::UpStairs => "take the stairs up",
            Self::DownElevator => "take the elevator down",
            Self::DownEscalator => "take the escalator down",
            Self::DownStairs => "take the stairs down",
            Self::Finish => "arrive at your destination",
        };
        write!(f, "{text}")
    }
}

/// One maneuver of a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Guidance text for this step.
    pub instruction: String,
    /// Distance from the previous step, in meters.
    pub distance_from_last_m: f64,
    /// Maneuver symbol.
    pub direction: StepDirection,
    /// Physical level the step ends on.
    pub level: i32,
    /// Location of the maneuver.
    pub position: Position,
}

/// A route computed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// The destination feature.
    pub destination: Feature,
    /// Total route length in meters.
    pub distance_m: f64,
    /// Ordered maneuvers from start to destination.
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Estimated trip duration in whole minutes, never below one.
    #[must_use]
    pub fn duration_minutes(&self) -> u64 {
        units::walk_minutes(self.distance_m)
    }

    /// Estimated number of steps to walk the route.
    #[must_use]
    pub fn step_count_estimate(&self) -> u64 {
        units::steps_for(self.distance_m)
    }

    /// Total distance rendered in the preferred unit.
    #[must_use]
    pub fn distance_display(&self, unit: DistanceUnit) -> String {
        units::format_distance(self.distance_m, unit)
    }
}

/// Kind of a route-update event.
///
/// The four end states (`Finished`, `Canceled`, `RouteNotFound`,
/// `RouteNetworkError`) are terminal: guidance is over and the event stays
/// visible as a dismissible banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteEventKind {
    /// A route is being computed for a fresh request.
    Calculating,
    /// The active route is being recomputed after the user strayed.
    Recalculating,
    /// Guidance advanced to a new instruction.
    DirectionNew,
    /// The current instruction was refreshed (distance countdown etc.).
    DirectionUpdate,
    /// The user reached the destination.
    Finished,
    /// The route was canceled.
    Canceled,
    /// No route exists for the request.
    RouteNotFound,
    /// Route computation failed to reach the service.
    RouteNetworkError,
}

impl RouteEventKind {
    /// Whether this event ends guidance.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Canceled | Self::RouteNotFound | Self::RouteNetworkError
        )
    }
}

impl std::fmt::Display for RouteEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Calculating => "calculating route",
            Self::Recalculating => "recalculating route",
            Self::DirectionNew => "new direction",
            Self::DirectionUpdate => "direction update",
            Self::Finished => "route finished",
            Self::Canceled => "route canceled",
            Self::RouteNotFound => "route not found",
            Self::RouteNetworkError => "route network error",
        };
        write!(f, "{text}")
    }
}

/// A route-update event descriptor from the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEvent {
    /// Event classification.
    pub kind: RouteEventKind,
    /// Guidance text accompanying the event.
    pub text: String,
    /// Optional engine-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RouteEvent {
    /// Create an event with no extra payload.
    #[must_use]
    pub fn new(kind: RouteEventKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            data: None,
        }
    }

    /// Whether this event ends guidance.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

/// Avoidance flags and tuning for a route request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Never route over stairs.
    pub avoid_stairs: bool,
    /// Never route through elevators.
    pub avoid_elevators: bool,
    /// Never route through revolving doors.
    pub avoid_revolving_doors: bool,
    /// Never route through narrow paths.
    pub avoid_narrow_paths: bool,
    /// Snap tolerance for the route start, in meters.
    pub path_fix_distance_m: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            avoid_stairs: false,
            avoid_elevators: false,
            avoid_revolving_doors: false,
            avoid_narrow_paths: false,
            path_fix_distance_m: DEFAULT_PATH_FIX_DISTANCE_M,
        }
    }
}

/// A request for a route to a destination feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Destination feature id.
    pub destination_id: String,
    /// Required intermediate stops, in visiting order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoint_ids: Vec<String>,
    /// Avoidance flags and tuning.
    pub options: RouteOptions,
}

impl RouteRequest {
    /// Request a route to a destination with the given options.
    #[must_use]
    pub fn new(destination_id: impl Into<String>, options: RouteOptions) -> Self {
        Self {
            destination_id: destination_id.into(),
            waypoint_ids: Vec::new(),
            options,
        }
    }

    /// Insert a required intermediate stop.
    #[must_use]
    pub fn with_waypoint(mut self, waypoint_id: impl Into<String>) -> Self {
        self.waypoint_ids.push(waypoint_id.into());
        self
    }
}
