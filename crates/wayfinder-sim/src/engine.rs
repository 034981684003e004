//! In-process engine implementation.
//!
//! [`SimEngine`] stands in for the vendor positioning SDK. It serves venue
//! data from a [`SimVenue`], synthesizes straight-line routes between
//! features (hopping floors through the nearest permitted connector), and
//! plays guidance back over the event bus at a configurable pace. Sessions
//! drive it through the [`Engine`] trait exactly as they would the real
//! thing, which is what makes it useful in tests and demos.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wayfinder::bus::{EventBus, Subscription};
use wayfinder::engine::{Engine, EngineEvent, EngineSettings, GuidanceConfig, SyncStatus};
use wayfinder::error::{Error, Result};
use wayfinder::route::{
    Route, RouteEvent, RouteEventKind, RouteOptions, RouteRequest, RouteStep, StepDirection,
};
use wayfinder::venue::{Amenity, CompassPoint, Feature, Floor, Position};

use crate::playback::{self, lerp, ScriptParams};
use crate::venue::{Connector, ConnectorKind, SimVenue};

/// Legs longer than this get an intermediate reassurance step.
const MIDPOINT_THRESHOLD_M: f64 = 40.0;

/// Walking distance charged per floor crossed on stairs or in an elevator.
const VERTICAL_M_PER_LEVEL: f64 = 4.0;

/// Tuning knobs for the simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Wall-clock delay between playback frames.
    pub tick: Duration,
    /// Distance covered per playback frame, in meters.
    pub stride_m: f64,
    /// Number of sync attempts that fail with a network error before one
    /// succeeds. Zero makes every sync succeed.
    pub sync_failures: u32,
    /// Distance at which a hazard warning fires, in meters.
    pub hazard_radius_m: f64,
    /// Distance at which a named area counts as entered, in meters.
    pub segment_radius_m: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            stride_m: 1.0,
            sync_failures: 0,
            hazard_radius_m: 10.0,
            segment_radius_m: 15.0,
        }
    }
}

/// Mutable engine state shared with the playback task.
#[derive(Debug, Default)]
pub(crate) struct SimState {
    pub(crate) authorized: bool,
    pub(crate) synced: bool,
    pub(crate) sync_failures_left: u32,
    pub(crate) position: Option<Position>,
    pub(crate) level: Option<i32>,
    pub(crate) route: Option<Route>,
    pub(crate) guidance: Option<GuidanceConfig>,
    pub(crate) settings: Option<EngineSettings>,
    pub(crate) navigating: bool,
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

pub(crate) fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A deterministic positioning engine backed by an in-memory venue.
#[derive(Debug)]
pub struct SimEngine {
    config: SimConfig,
    venue: SimVenue,
    bus: EventBus<EngineEvent>,
    state: Arc<Mutex<SimState>>,
}

impl SimEngine {
    /// Engine over the demo venue with default pacing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Engine over the demo venue with custom pacing.
    #[must_use]
    pub fn with_config(config: SimConfig) -> Self {
        Self::with_venue(SimVenue::demo(), config)
    }

    /// Engine over an arbitrary venue.
    #[must_use]
    pub fn with_venue(venue: SimVenue, config: SimConfig) -> Self {
        let state = SimState {
            sync_failures_left: config.sync_failures,
            ..SimState::default()
        };
        Self {
            config,
            venue,
            bus: EventBus::new(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// The venue this engine serves.
    #[must_use]
    pub fn venue(&self) -> &SimVenue {
        &self.venue
    }

    fn origin(&self) -> (Position, i32) {
        let state = lock(&self.state);
        (
            state.position.unwrap_or(self.venue.entrance),
            state.level.unwrap_or(0),
        )
    }

    /// Resolve a request's waypoints and destination against the venue.
    fn resolve_stops(&self, request: &RouteRequest) -> Result<Vec<Feature>> {
        let mut stops = Vec::with_capacity(request.waypoint_ids.len() + 1);
        for id in &request.waypoint_ids {
            let feature = self
                .venue
                .feature(id)
                .ok_or_else(|| Error::unknown_destination(id))?;
            stops.push(feature.clone());
        }
        let destination = self
            .venue
            .feature(&request.destination_id)
            .filter(|f| f.is_poi())
            .ok_or_else(|| Error::unknown_destination(&request.destination_id))?;
        stops.push(destination.clone());
        Ok(stops)
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for SimEngine {
    async fn authorize(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::authorization("empty token"));
        }
        lock(&self.state).authorized = true;
        info!(venue = %self.venue.name, "engine authorized");
        Ok(())
    }

    async fn request_permissions(&self) -> Result<()> {
        if !lock(&self.state).authorized {
            return Err(Error::NotAuthorized);
        }
        debug!("location permission granted");
        Ok(())
    }

    async fn start_sync(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.authorized {
            return Err(Error::NotAuthorized);
        }
        self.bus
            .publish(&EngineEvent::SyncStatus(SyncStatus::InitialRunning));
        if state.sync_failures_left > 0 {
            state.sync_failures_left -= 1;
            drop(state);
            warn!("venue sync failed, network unreachable");
            self.bus
                .publish(&EngineEvent::SyncStatus(SyncStatus::InitialNetworkError));
            return Ok(());
        }

        // The first successful sync also produces the first position fix.
        let first_fix = !state.synced && state.position.is_none();
        state.synced = true;
        if first_fix {
            state.position = Some(self.venue.entrance);
            state.level = Some(0);
        }
        drop(state);

        info!(venue = %self.venue.name, "venue sync complete");
        self.bus
            .publish(&EngineEvent::SyncStatus(SyncStatus::InitialFinished));
        self.bus.publish(&EngineEvent::FeaturesChanged);
        if first_fix {
            self.bus
                .publish(&EngineEvent::PositionUpdated(self.venue.entrance));
            if let Some(floor) = self.venue.floor(0) {
                self.bus
                    .publish(&EngineEvent::FloorChanged(Some(floor.clone())));
            }
            self.bus
                .publish(&EngineEvent::GeofenceEntered(self.venue.coverage.clone()));
        }
        Ok(())
    }

    fn apply_settings(&self, settings: &EngineSettings) -> Result<()> {
        debug!("engine settings applied");
        lock(&self.state).settings = Some(settings.clone());
        Ok(())
    }

    fn apply_guidance(&self, guidance: &GuidanceConfig) -> Result<()> {
        debug!(tts = guidance.tts_enabled, "guidance configuration applied");
        lock(&self.state).guidance = Some(guidance.clone());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<EngineEvent> {
        self.bus.subscribe()
    }

    async fn calculate_route(&self, request: &RouteRequest) -> Result<Option<Route>> {
        let stops = self.resolve_stops(request)?;
        let (from, level) = self.origin();
        Ok(route_via(&self.venue, from, level, &stops, &request.options))
    }

    async fn preview_route(&self, request: &RouteRequest) -> Result<()> {
        let stops = self.resolve_stops(request)?;
        self.bus.publish(&EngineEvent::RouteUpdate(RouteEvent::new(
            RouteEventKind::Calculating,
            "Calculating route",
        )));
        let (from, level) = self.origin();
        match route_via(&self.venue, from, level, &stops, &request.options) {
            Some(route) => {
                lock(&self.state).route = Some(route.clone());
                info!(
                    destination = %route.destination.title,
                    distance_m = route.distance_m,
                    "route computed"
                );
                self.bus.publish(&EngineEvent::RouteComputed(route));
            }
            None => {
                let destination = &stops[stops.len() - 1];
                warn!(destination = %destination.title, "no permitted route");
                self.bus.publish(&EngineEvent::RouteUpdate(RouteEvent::new(
                    RouteEventKind::RouteNotFound,
                    format!("No route to {}", destination.title),
                )));
            }
        }
        Ok(())
    }

    fn start_navigation(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.navigating {
            return Err(Error::engine("guidance is already running"));
        }
        let Some(route) = state.route.clone() else {
            return Err(Error::engine("no previewed route to start"));
        };
        let params = ScriptParams {
            venue: &self.venue,
            guidance: state.guidance.as_ref(),
            stride_m: self.config.stride_m,
            hazard_radius_m: self.config.hazard_radius_m,
            segment_radius_m: self.config.segment_radius_m,
        };
        let frames = playback::build_script(&route, &params);
        let cancel = Arc::new(AtomicBool::new(false));
        state.navigating = true;
        state.cancel = Some(Arc::clone(&cancel));
        drop(state);

        info!(destination = %route.destination.title, "guidance started");
        tokio::spawn(playback::run(
            self.bus.clone(),
            Arc::clone(&self.state),
            frames,
            self.config.tick,
            cancel,
        ));
        Ok(())
    }

    fn cancel_navigation(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some(cancel) = &state.cancel {
            cancel.store(true, std::sync::atomic::Ordering::SeqCst);
            debug!("guidance cancel requested");
            return Ok(());
        }
        // A previewed route that never started has no playback task to
        // acknowledge the cancel, so answer here.
        if state.route.take().is_some() {
            drop(state);
            self.bus.publish(&EngineEvent::RouteUpdate(RouteEvent::new(
                RouteEventKind::Canceled,
                "Route canceled",
            )));
        }
        Ok(())
    }

    async fn features(&self) -> Result<Vec<Feature>> {
        if !lock(&self.state).synced {
            return Ok(Vec::new());
        }
        Ok(self.venue.features.clone())
    }

    async fn amenities(&self) -> Result<Vec<Amenity>> {
        if !lock(&self.state).synced {
            return Ok(Vec::new());
        }
        Ok(self.venue.amenities.clone())
    }

    async fn floors(&self) -> Result<Vec<Floor>> {
        if !lock(&self.state).synced {
            return Ok(Vec::new());
        }
        Ok(self.venue.floors.clone())
    }

    fn current_position(&self) -> Option<Position> {
        lock(&self.state).position
    }

    fn current_floor(&self) -> Option<Floor> {
        lock(&self.state)
            .level
            .and_then(|level| self.venue.floor(level).cloned())
    }
}

/// Synthesize a route from `from` straight to a single destination.
#[cfg(test)]
pub(crate) fn route_between(
    venue: &SimVenue,
    from: Position,
    from_level: i32,
    destination: &Feature,
    options: &RouteOptions,
) -> Option<Route> {
    route_via(
        venue,
        from,
        from_level,
        std::slice::from_ref(destination),
        options,
    )
}

/// Synthesize a route visiting every stop in order, the last being the
/// destination. Floors are crossed through the nearest connector the
/// avoidance options permit; `None` when a crossing has no permitted
/// connector.
fn route_via(
    venue: &SimVenue,
    from: Position,
    from_level: i32,
    stops: &[Feature],
    options: &RouteOptions,
) -> Option<Route> {
    let destination = stops.last()?;
    let mut rest: Vec<RouteStep> = Vec::new();
    let mut pos = from;
    let mut level = from_level;

    for (i, stop) in stops.iter().enumerate() {
        if level != stop.level {
            let connector = nearest_connector(venue, pos, level, stop.level, options)?;
            let remainder = push_leg(&mut rest, pos, connector.position, level);
            rest.push(connector_step(venue, connector, remainder, level, stop.level));
            pos = connector.position;
            level = stop.level;
        }
        let remainder = push_leg(&mut rest, pos, stop.position, level);
        if i == stops.len() - 1 {
            rest.push(finish_step(stop, remainder));
        } else {
            rest.push(waypoint_step(stop, remainder));
        }
        pos = stop.position;
    }

    let mut steps = vec![start_step(from, from_level, rest[0].position)];
    steps.append(&mut rest);
    let distance_m = steps.iter().map(|s| s.distance_from_last_m).sum();
    Some(Route {
        destination: destination.clone(),
        distance_m,
        steps,
    })
}

fn nearest_connector<'a>(
    venue: &'a SimVenue,
    from: Position,
    from_level: i32,
    to_level: i32,
    options: &RouteOptions,
) -> Option<&'a Connector> {
    venue
        .connectors
        .iter()
        .filter(|c| c.serves(from_level) && c.serves(to_level))
        .filter(|c| match c.kind {
            ConnectorKind::Stairs => !options.avoid_stairs,
            ConnectorKind::Elevator => !options.avoid_elevators,
        })
        .min_by(|a, b| {
            from.distance_m(&a.position)
                .total_cmp(&from.distance_m(&b.position))
        })
}

fn start_step(from: Position, level: i32, toward: Position) -> RouteStep {
    let compass = CompassPoint::from_bearing(from.bearing_to(&toward));
    RouteStep {
        instruction: format!("Head {compass}"),
        distance_from_last_m: 0.0,
        direction: StepDirection::Start,
        level,
        position: from,
    }
}

/// Append the walkable part of a leg and return the distance left for the
/// caller's maneuver step. Long legs get a midpoint reassurance step.
fn push_leg(steps: &mut Vec<RouteStep>, from: Position, to: Position, level: i32) -> f64 {
    let total = from.distance_m(&to);
    if total > MIDPOINT_THRESHOLD_M {
        steps.push(RouteStep {
            instruction: "Continue straight".to_string(),
            distance_from_last_m: total / 2.0,
            direction: StepDirection::Straight,
            level,
            position: lerp(from, to, 0.5),
        });
        total / 2.0
    } else {
        total
    }
}

fn connector_step(
    venue: &SimVenue,
    connector: &Connector,
    horizontal_m: f64,
    from_level: i32,
    to_level: i32,
) -> RouteStep {
    let up = to_level > from_level;
    let direction = match (connector.kind, up) {
        (ConnectorKind::Stairs, true) => StepDirection::UpStairs,
        (ConnectorKind::Stairs, false) => StepDirection::DownStairs,
        (ConnectorKind::Elevator, true) => StepDirection::UpElevator,
        (ConnectorKind::Elevator, false) => StepDirection::DownElevator,
    };
    let what = match connector.kind {
        ConnectorKind::Stairs => "stairs",
        ConnectorKind::Elevator => "elevator",
    };
    let way = if up { "up" } else { "down" };
    let floor_name = venue
        .floor(to_level)
        .map_or_else(|| format!("level {to_level}"), |f| f.name.clone());
    RouteStep {
        instruction: format!("Take the {what} {way} to {floor_name}"),
        distance_from_last_m: horizontal_m
            + VERTICAL_M_PER_LEVEL * f64::from((to_level - from_level).abs()),
        direction,
        level: to_level,
        position: connector.position,
    }
}

fn waypoint_step(stop: &Feature, distance_m: f64) -> RouteStep {
    RouteStep {
        instruction: format!("Stop by {}", stop.title),
        distance_from_last_m: distance_m,
        direction: StepDirection::Straight,
        level: stop.level,
        position: stop.position,
    }
}

fn finish_step(destination: &Feature, distance_m: f64) -> RouteStep {
    RouteStep {
        instruction: format!("You have arrived at {}", destination.title),
        distance_from_last_m: distance_m,
        direction: StepDirection::Finish,
        level: destination.level,
        position: destination.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sub: &mut Subscription<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(event) = sub.try_recv() {
            events.push(event);
        }
        events
    }

    async fn synced_engine() -> SimEngine {
        let engine = SimEngine::new();
        engine.authorize("token").await.unwrap();
        engine.start_sync().await.unwrap();
        engine
    }

    fn options(avoid_stairs: bool, avoid_elevators: bool) -> RouteOptions {
        RouteOptions {
            avoid_stairs,
            avoid_elevators,
            ..RouteOptions::default()
        }
    }

    #[tokio::test]
    async fn test_authorize_rejects_empty_token() {
        let engine = SimEngine::new();
        assert!(matches!(
            engine.authorize("  ").await,
            Err(Error::Authorization { .. })
        ));
        assert!(matches!(
            engine.start_sync().await,
            Err(Error::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_sync_publishes_data_and_first_fix() {
        let engine = SimEngine::new();
        let mut sub = engine.subscribe();
        engine.authorize("token").await.unwrap();
        engine.start_sync().await.unwrap();

        let events = drain(&mut sub);
        assert!(matches!(
            events[0],
            EngineEvent::SyncStatus(SyncStatus::InitialRunning)
        ));
        assert!(matches!(
            events[1],
            EngineEvent::SyncStatus(SyncStatus::InitialFinished)
        ));
        assert!(matches!(events[2], EngineEvent::FeaturesChanged));
        assert!(matches!(events[3], EngineEvent::PositionUpdated(_)));
        assert!(
            matches!(&events[4], EngineEvent::FloorChanged(Some(floor)) if floor.level == 0)
        );
        assert!(
            matches!(&events[5], EngineEvent::GeofenceEntered(g) if g.id == crate::venue::COVERAGE_GEOFENCE_ID)
        );

        assert!(engine.current_position().is_some());
        assert_eq!(engine.current_floor().unwrap().level, 0);
    }

    #[tokio::test]
    async fn test_sync_failures_then_success() {
        let engine = SimEngine::with_config(SimConfig {
            sync_failures: 1,
            ..SimConfig::default()
        });
        let mut sub = engine.subscribe();
        engine.authorize("token").await.unwrap();

        engine.start_sync().await.unwrap();
        let events = drain(&mut sub);
        assert!(matches!(
            events.last(),
            Some(EngineEvent::SyncStatus(SyncStatus::InitialNetworkError))
        ));
        assert!(engine.features().await.unwrap().is_empty());

        engine.start_sync().await.unwrap();
        let events = drain(&mut sub);
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::SyncStatus(SyncStatus::InitialFinished))));
        assert!(!engine.features().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_venue_data_gated_on_sync() {
        let engine = SimEngine::new();
        engine.authorize("token").await.unwrap();
        assert!(engine.features().await.unwrap().is_empty());
        assert!(engine.amenities().await.unwrap().is_empty());
        assert!(engine.floors().await.unwrap().is_empty());

        engine.start_sync().await.unwrap();
        assert!(!engine.features().await.unwrap().is_empty());
        assert!(!engine.amenities().await.unwrap().is_empty());
        assert_eq!(engine.floors().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_calculate_route_rejects_unknown_and_non_poi() {
        let engine = synced_engine().await;
        let unknown = RouteRequest::new("poi-bogus", RouteOptions::default());
        assert!(matches!(
            engine.calculate_route(&unknown).await,
            Err(Error::UnknownDestination { .. })
        ));

        // Hazards are features but not destinations.
        let hazard = RouteRequest::new("hz-wet-floor", RouteOptions::default());
        assert!(engine.calculate_route(&hazard).await.is_err());
    }

    #[tokio::test]
    async fn test_same_level_route_shape() {
        let engine = synced_engine().await;
        let request = RouteRequest::new("poi-cafe", RouteOptions::default());
        let route = engine.calculate_route(&request).await.unwrap().unwrap();

        assert_eq!(route.steps.first().unwrap().direction, StepDirection::Start);
        assert_eq!(route.steps.last().unwrap().direction, StepDirection::Finish);
        let direct = engine
            .venue()
            .entrance
            .distance_m(&route.destination.position);
        assert!((route.distance_m - direct).abs() < 1.0);
    }

    #[test]
    fn test_cross_level_route_prefers_nearest_connector() {
        let venue = SimVenue::demo();
        let pharmacy = venue.feature("poi-pharmacy").unwrap().clone();

        // The elevator sits closer to the entrance than the stairs.
        let route =
            route_between(&venue, venue.entrance, 0, &pharmacy, &options(false, false)).unwrap();
        assert!(route.steps.iter().any(|s| s.direction.is_elevator()));

        let route =
            route_between(&venue, venue.entrance, 0, &pharmacy, &options(false, true)).unwrap();
        assert!(route.steps.iter().any(|s| s.direction.is_stairs()));
        assert!(!route.steps.iter().any(|s| s.direction.is_elevator()));
    }

    #[test]
    fn test_connector_step_names_target_floor() {
        let venue = SimVenue::demo();
        let pharmacy = venue.feature("poi-pharmacy").unwrap().clone();
        let route =
            route_between(&venue, venue.entrance, 0, &pharmacy, &options(true, false)).unwrap();

        let connector = route
            .steps
            .iter()
            .find(|s| s.direction.is_level_change())
            .unwrap();
        assert_eq!(connector.instruction, "Take the elevator up to First Floor");
        assert_eq!(connector.level, 1);
    }

    #[test]
    fn test_stairs_only_floor_unreachable_when_avoiding_stairs() {
        let venue = SimVenue::demo();
        let clinic = venue.feature("poi-clinic").unwrap().clone();

        let with_stairs =
            route_between(&venue, venue.entrance, 0, &clinic, &options(false, false));
        assert!(with_stairs.is_some());

        let without = route_between(&venue, venue.entrance, 0, &clinic, &options(true, false));
        assert!(without.is_none());
    }

    #[test]
    fn test_waypoints_visited_in_order() {
        let venue = SimVenue::demo();
        let info = venue.feature("poi-info").unwrap().clone();
        let cafe = venue.feature("poi-cafe").unwrap().clone();
        let route = route_via(
            &venue,
            venue.entrance,
            0,
            &[info.clone(), cafe],
            &RouteOptions::default(),
        )
        .unwrap();

        let stop = route
            .steps
            .iter()
            .find(|s| s.instruction.starts_with("Stop by"))
            .unwrap();
        assert_eq!(stop.instruction, format!("Stop by {}", info.title));
        assert_eq!(route.destination.id, "poi-cafe");
    }

    #[tokio::test]
    async fn test_preview_publishes_route_computed() {
        let engine = synced_engine().await;
        let mut sub = engine.subscribe();
        let request = RouteRequest::new("poi-cafe", RouteOptions::default());
        engine.preview_route(&request).await.unwrap();

        let events = drain(&mut sub);
        assert!(matches!(
            &events[0],
            EngineEvent::RouteUpdate(u) if u.kind == RouteEventKind::Calculating
        ));
        assert!(matches!(&events[1], EngineEvent::RouteComputed(_)));
    }

    #[tokio::test]
    async fn test_preview_publishes_route_not_found() {
        let engine = synced_engine().await;
        let mut sub = engine.subscribe();
        let request = RouteRequest::new("poi-clinic", options(true, false));
        engine.preview_route(&request).await.unwrap();

        let events = drain(&mut sub);
        assert!(matches!(
            &events[1],
            EngineEvent::RouteUpdate(u)
                if u.kind == RouteEventKind::RouteNotFound && u.text.contains("Eye Clinic")
        ));
    }

    #[tokio::test]
    async fn test_start_navigation_requires_previewed_route() {
        let engine = synced_engine().await;
        assert!(engine.start_navigation().is_err());

        let request = RouteRequest::new("poi-cafe", RouteOptions::default());
        engine.preview_route(&request).await.unwrap();
        engine.start_navigation().unwrap();
        assert!(engine.start_navigation().is_err());
    }

    #[tokio::test]
    async fn test_cancel_before_start_answers_directly() {
        let engine = synced_engine().await;
        let mut sub = engine.subscribe();

        // Nothing to cancel is not an error.
        engine.cancel_navigation().unwrap();
        assert!(drain(&mut sub).is_empty());

        let request = RouteRequest::new("poi-cafe", RouteOptions::default());
        engine.preview_route(&request).await.unwrap();
        drain(&mut sub);
        engine.cancel_navigation().unwrap();
        let events = drain(&mut sub);
        assert!(matches!(
            &events[0],
            EngineEvent::RouteUpdate(u) if u.kind == RouteEventKind::Canceled
        ));
        assert!(lock(&engine.state).route.is_none());
    }

    #[tokio::test]
    async fn test_guidance_configuration_is_recorded() {
        let engine = synced_engine().await;
        let guidance = wayfinder::preferences::Preferences::default().guidance_config();
        engine.apply_guidance(&guidance).unwrap();
        engine
            .apply_settings(&EngineSettings::default())
            .unwrap();
        let state = lock(&engine.state);
        assert!(state.guidance.is_some());
        assert!(state.settings.is_some());
    }
}
