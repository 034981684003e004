//! Navigation session wiring.
//!
//! A [`NavigationSession`] owns the engine subscription and every piece of
//! mutable navigation state: the route event normalizer, the map view and
//! the search model. It consumes the engine's single in-order event stream,
//! dispatches each event to the right model, and broadcasts state snapshots
//! over a watch channel for observers.
//!
//! All mutation happens on the task driving [`NavigationSession::next_event`];
//! nothing here locks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bus::Subscription;
use crate::config::Config;
use crate::engine::{Engine, EngineEvent};
use crate::error::{Error, Result};
use crate::navigation::{NavigationState, RouteEventNormalizer, UpdateOutcome};
use crate::preferences::adapter::PreferenceAdapter;
use crate::route::RouteRequest;
use crate::screens::{MapViewState, SearchModel};

/// One observable state snapshot: navigation plus map view.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Current navigation state.
    pub navigation: NavigationState,
    /// Current map view state.
    pub map: MapViewState,
}

/// A running navigation session against one engine.
pub struct NavigationSession {
    engine: Arc<dyn Engine>,
    adapter: PreferenceAdapter,
    events: Subscription<EngineEvent>,
    normalizer: RouteEventNormalizer,
    map: MapViewState,
    search: SearchModel,
    sync_retry_delay: Duration,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl std::fmt::Debug for NavigationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationSession")
            .field("navigation", self.normalizer.state())
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}

impl NavigationSession {
    /// Bring up a session: gate on the policy flag, subscribe, authorize,
    /// push settings and preferences, request permissions and start the
    /// venue sync.
    ///
    /// The event subscription is taken before the first engine command so
    /// nothing emitted during startup is lost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyNotAccepted`] when the privacy policy has not
    /// been accepted on this device, or any error from the engine's
    /// authorization and configuration calls.
    pub async fn start(
        config: &Config,
        engine: Arc<dyn Engine>,
        adapter: PreferenceAdapter,
    ) -> Result<Self> {
        if !adapter.policy_accepted() {
            return Err(Error::PolicyNotAccepted);
        }

        let events = engine.subscribe();

        engine.authorize(&config.venue.auth_token).await?;
        engine.apply_settings(&config.engine_settings())?;
        adapter.apply(engine.as_ref())?;
        engine.request_permissions().await?;
        engine.start_sync().await?;

        let mut map = MapViewState::new(
            config.venue.covered_geofence_id.clone(),
            config.venue.default_level,
        );
        if let Some(position) = engine.current_position() {
            map.on_position_update(position);
        }
        if let Some(floor) = engine.current_floor() {
            map.on_floor_changed(Some(&floor));
        }

        // Seed venue data; an engine that has not synced yet legitimately
        // has nothing, the features-changed event refreshes later.
        let mut search = SearchModel::new();
        match engine.features().await {
            Ok(features) => search.set_features(features),
            Err(err) => debug!("initial feature load failed: {err}"),
        }
        match engine.amenities().await {
            Ok(amenities) => search.set_amenities(amenities),
            Err(err) => debug!("initial amenity load failed: {err}"),
        }

        let normalizer = RouteEventNormalizer::new(config.suppression_window());
        let (state_tx, _) = watch::channel(SessionSnapshot {
            navigation: normalizer.snapshot(),
            map: map.clone(),
        });

        info!("navigation session started");
        Ok(Self {
            engine,
            adapter,
            events,
            normalizer,
            map,
            search,
            sync_retry_delay: config.sync_retry_delay(),
            state_tx,
        })
    }

    /// Current navigation state.
    #[must_use]
    pub fn navigation(&self) -> &NavigationState {
        self.normalizer.state()
    }

    /// Current map view state.
    #[must_use]
    pub fn map(&self) -> &MapViewState {
        &self.map
    }

    /// The venue search model.
    #[must_use]
    pub fn search(&self) -> &SearchModel {
        &self.search
    }

    /// Mutable access to the search model, for filter changes.
    pub fn search_mut(&mut self) -> &mut SearchModel {
        &mut self.search
    }

    /// The preference adapter this session applies.
    #[must_use]
    pub fn preferences(&self) -> &PreferenceAdapter {
        &self.adapter
    }

    /// Observe state snapshots. The receiver sees every broadcast made
    /// after this call and releases itself when dropped.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    /// Receive and apply the next engine event.
    ///
    /// Returns the event after dispatching it, or `None` once the engine
    /// closes its event stream.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let event = self.events.recv().await?;
        self.handle_event(&event).await;
        Some(event)
    }

    /// Dispatch one engine event into the session's models.
    pub async fn handle_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::PositionUpdated(position) => {
                self.map.on_position_update(*position);
            }
            EngineEvent::FloorChanged(floor) => {
                self.map.on_floor_changed(floor.as_ref());
            }
            EngineEvent::GeofenceEntered(geofence) => {
                self.map.on_geofence_entered(geofence);
            }
            EngineEvent::GeofenceExited(geofence) => {
                self.map.on_geofence_exited(geofence);
            }
            EngineEvent::RouteComputed(route) => {
                self.normalizer.on_route(route.clone());
            }
            EngineEvent::RouteUpdate(update) => {
                if let UpdateOutcome::Applied { recenter: true } =
                    self.normalizer.on_route_update(update.clone())
                {
                    self.map.recenter();
                }
            }
            EngineEvent::HazardEntered(feature) => {
                self.normalizer.on_hazard(feature.clone());
            }
            EngineEvent::SegmentEntered(feature) => {
                self.normalizer.on_segment_entered(feature.clone());
            }
            EngineEvent::SegmentExited(_) => {
                self.normalizer.on_segment_exited();
            }
            EngineEvent::FeaturesChanged => {
                self.refresh_venue_data().await;
            }
            EngineEvent::SyncStatus(status) => {
                if status.is_initial_failure() {
                    self.schedule_sync_retry();
                }
            }
        }
        self.broadcast();
    }

    /// Request a route preview to a destination.
    ///
    /// Resolves the stored avoidance preferences first; the result arrives
    /// through route events, not from this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request.
    pub async fn preview_route(&self, destination_id: &str) -> Result<()> {
        let options = self.adapter.route_options();
        debug!(destination = destination_id, "requesting route preview");
        self.engine
            .preview_route(&RouteRequest::new(destination_id, options))
            .await
    }

    /// Start live guidance along the previewed route.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command.
    pub fn start_navigation(&self) -> Result<()> {
        self.engine.start_navigation()
    }

    /// Ask the engine to cancel guidance.
    ///
    /// Navigation state stays as it is until the engine confirms with a
    /// `CANCELED` route update.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command.
    pub fn cancel_navigation(&self) -> Result<()> {
        self.engine.cancel_navigation()
    }

    /// Dismiss the end-state banner.
    pub fn dismiss(&mut self) {
        self.normalizer.dismiss();
        self.broadcast();
    }

    /// Apply the back-press rule.
    ///
    /// A showing terminal banner is dismissed; an active route is canceled;
    /// with neither, the press is not handled here.
    ///
    /// # Errors
    ///
    /// Returns an error if the cancel command fails.
    pub fn back_press(&mut self) -> Result<bool> {
        let state = self.normalizer.state();
        if state.route().is_none() && state.last_update().is_none() {
            return Ok(false);
        }
        if state.has_terminal_banner() {
            self.dismiss();
        } else {
            self.cancel_navigation()?;
        }
        Ok(true)
    }

    /// Re-center the map on the user. Returns whether the camera moved.
    pub fn recenter(&mut self) -> bool {
        let moved = self.map.recenter();
        self.broadcast();
        moved
    }

    /// Show a specific floor on the map.
    pub fn select_level(&mut self, level: i32) {
        self.map.select_level(level);
        self.broadcast();
    }

    async fn refresh_venue_data(&mut self) {
        match self.engine.features().await {
            Ok(features) => self.search.set_features(features),
            Err(err) => warn!("feature refresh failed: {err}"),
        }
        match self.engine.amenities().await {
            Ok(amenities) => self.search.set_amenities(amenities),
            Err(err) => warn!("amenity refresh failed: {err}"),
        }
    }

    /// Retry the initial venue sync after a fixed delay.
    fn schedule_sync_retry(&self) {
        let engine = Arc::clone(&self.engine);
        let delay = self.sync_retry_delay;
        warn!("initial venue sync failed, retrying in {delay:?}");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = engine.start_sync().await {
                warn!("venue sync retry failed: {err}");
            }
        });
    }

    fn broadcast(&self) {
        let _ = self.state_tx.send_replace(SessionSnapshot {
            navigation: self.normalizer.snapshot(),
            map: self.map.clone(),
        });
    }
}
