//! The positioning/routing engine contract.
//!
//! Everything that positions the user, computes routes, and speaks guidance
//! lives behind the [`Engine`] trait. The core crate never talks to a
//! concrete SDK; it receives an engine as an injected dependency and only
//! consumes this surface. Events flow back on a single in-order channel via
//! [`Engine::subscribe`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bus::Subscription;
use crate::error::Result;
use crate::route::{Route, RouteEvent, RouteRequest};
use crate::units::UnitConversion;
use crate::venue::{Amenity, Feature, Floor, Geofence, LevelOverride, Position};

/// Venue-data synchronization status reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// The first full venue download is in progress.
    InitialRunning,
    /// The first full venue download failed.
    InitialError,
    /// The first full venue download could not reach the network.
    InitialNetworkError,
    /// The first full venue download completed.
    InitialFinished,
    /// A background incremental update completed.
    Incremental,
}

impl SyncStatus {
    /// Whether this status is a failed initial sync that warrants a retry.
    #[must_use]
    pub fn is_initial_failure(&self) -> bool {
        matches!(self, Self::InitialError | Self::InitialNetworkError)
    }
}

/// Numeric tuning constants pushed to the engine at startup.
///
/// These are fixed configuration, not user preferences. The defaults are the
/// values the app ships with; deployments can override them in the config
/// file's `routing` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Enable pedestrian dead reckoning between position fixes.
    pub pdr_enabled: bool,
    /// PDR correction threshold in meters.
    pub pdr_correction_threshold_m: f64,
    /// Snap the guidance position onto the route path.
    pub snap_to_route: bool,
    /// Snap-to-route capture distance in meters.
    pub snap_to_route_threshold_m: f64,
    /// Snap the displayed user dot onto the route path.
    pub location_snapping_enabled: bool,
    /// Displayed-location snap distance in meters.
    pub location_snapping_threshold_m: f64,
    /// Recompute the route when the user strays.
    pub reroute_enabled: bool,
    /// Stray distance that triggers a reroute, in meters.
    pub reroute_threshold_m: f64,
    /// Distance from the destination that finishes the route, in meters.
    pub route_finish_threshold_m: f64,
    /// Distance at which the next instruction is announced, in meters.
    pub step_immediate_threshold_m: f64,
    /// Distance at which the next instruction is prepared, in meters.
    pub step_preparation_threshold_m: f64,
    /// Distance drift before a heading correction is spoken, in meters.
    pub heading_correction_threshold_m: f64,
    /// Heading drift before a correction is spoken, in degrees.
    pub heading_correction_threshold_degrees: f64,
    /// Display-level override table forwarded to the engine.
    pub level_overrides: Vec<LevelOverride>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pdr_enabled: true,
            pdr_correction_threshold_m: 4.0,
            snap_to_route: true,
            snap_to_route_threshold_m: 20.0,
            location_snapping_enabled: true,
            location_snapping_threshold_m: 6.0,
            reroute_enabled: true,
            reroute_threshold_m: 3.0,
            route_finish_threshold_m: 2.5,
            step_immediate_threshold_m: 3.5,
            step_preparation_threshold_m: 3.0,
            heading_correction_threshold_m: 8.0,
            heading_correction_threshold_degrees: 90.0,
            level_overrides: Vec::new(),
        }
    }
}

/// Spoken-guidance configuration derived from the user's preferences.
///
/// Equality is meaningful: applying the same preference set twice must
/// produce equal values, which is how idempotence is asserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Master switch for spoken guidance.
    pub tts_enabled: bool,
    /// Announce heading corrections.
    pub heading_correction: bool,
    /// Announce upcoming decision points.
    pub decision_point_alerts: bool,
    /// Announce nearby hazards.
    pub hazard_alerts: bool,
    /// Announce nearby landmarks.
    pub landmark_alerts: bool,
    /// Announce entering named areas.
    pub segment_alerts: bool,
    /// Periodically confirm route progress.
    pub reassurance_enabled: bool,
    /// Distance between reassurance announcements, in meters.
    pub reassurance_distance_m: u32,
    /// Metadata keys unlocking extra guidance content (accessibility).
    pub accessibility_metadata_keys: Vec<u32>,
    /// Unit table for spoken distances.
    pub unit_table: UnitConversion,
}

/// An event published by the engine.
///
/// Events are delivered in emission order on a single channel; consumers
/// never need to reorder them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The user's position changed.
    PositionUpdated(Position),
    /// The user's floor changed, or became unknown.
    FloorChanged(Option<Floor>),
    /// The user entered a geofenced region.
    GeofenceEntered(Geofence),
    /// The user left a geofenced region.
    GeofenceExited(Geofence),
    /// A requested route was computed.
    RouteComputed(Route),
    /// Guidance progress for the active route.
    RouteUpdate(RouteEvent),
    /// The user came near a hazard feature.
    HazardEntered(Feature),
    /// The user entered a named area.
    SegmentEntered(Feature),
    /// The user left a named area.
    SegmentExited(Feature),
    /// Venue features or amenities changed after a sync.
    FeaturesChanged,
    /// Synchronization progress.
    SyncStatus(SyncStatus),
}

/// The positioning/routing engine as consumed by this crate.
///
/// Command methods are fire-and-forget against engine state;
/// [`Engine::calculate_route`] is the one promise-style call, returning the
/// computed route directly instead of via events. Everything else the
/// engine wants to say arrives through [`Engine::subscribe`].
#[async_trait]
pub trait Engine: Send + Sync {
    /// Authorize against the positioning service.
    async fn authorize(&self, token: &str) -> Result<()>;

    /// Request platform location permissions.
    async fn request_permissions(&self) -> Result<()>;

    /// Begin (or retry) venue-data synchronization.
    async fn start_sync(&self) -> Result<()>;

    /// Push tuning constants. Idempotent.
    fn apply_settings(&self, settings: &EngineSettings) -> Result<()>;

    /// Push spoken-guidance configuration. Idempotent.
    fn apply_guidance(&self, guidance: &GuidanceConfig) -> Result<()>;

    /// Subscribe to the engine's event stream.
    fn subscribe(&self) -> Subscription<EngineEvent>;

    /// Compute a route without starting guidance.
    ///
    /// Resolves to `None` when no route satisfies the request.
    async fn calculate_route(&self, request: &RouteRequest) -> Result<Option<Route>>;

    /// Compute a route and preview it via events (`CALCULATING`, then
    /// `RouteComputed` or a terminal failure).
    async fn preview_route(&self, request: &RouteRequest) -> Result<()>;

    /// Start live guidance along the previewed route.
    fn start_navigation(&self) -> Result<()>;

    /// Ask the engine to cancel guidance.
    ///
    /// Completion is signaled by a `CANCELED` route update, not by this
    /// call returning.
    fn cancel_navigation(&self) -> Result<()>;

    /// All venue features.
    async fn features(&self) -> Result<Vec<Feature>>;

    /// All amenity categories.
    async fn amenities(&self) -> Result<Vec<Amenity>>;

    /// All venue floors.
    async fn floors(&self) -> Result<Vec<Floor>>;

    /// Last known user position, if any.
    fn current_position(&self) -> Option<Position>;

    /// Floor the user is currently on, if known.
    fn current_floor(&self) -> Option<Floor>;
}
