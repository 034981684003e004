//! Shared test doubles.
//!
//! `RecordingEngine` satisfies the full engine contract while recording
//! every call, and lets tests inject events into its subscription stream.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::bus::{EventBus, Subscription};
use crate::engine::{Engine, EngineEvent, EngineSettings, GuidanceConfig};
use crate::error::{Error, Result};
use crate::route::{Route, RouteRequest};
use crate::venue::{Amenity, Feature, Floor, Position};

/// Engine double that records every command it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    bus: EventBus<EngineEvent>,
    pub(crate) tokens: Mutex<Vec<String>>,
    pub(crate) permission_requests: Mutex<u32>,
    pub(crate) sync_requests: Mutex<u32>,
    pub(crate) settings: Mutex<Vec<EngineSettings>>,
    pub(crate) guidance: Mutex<Vec<GuidanceConfig>>,
    pub(crate) calculate_requests: Mutex<Vec<RouteRequest>>,
    pub(crate) preview_requests: Mutex<Vec<RouteRequest>>,
    pub(crate) navigation_starts: Mutex<u32>,
    pub(crate) navigation_cancels: Mutex<u32>,
    /// What `calculate_route` resolves to.
    pub(crate) route_result: Mutex<Option<Route>>,
    pub(crate) venue_features: Mutex<Vec<Feature>>,
    pub(crate) venue_amenities: Mutex<Vec<Amenity>>,
    pub(crate) venue_floors: Mutex<Vec<Floor>>,
    pub(crate) position: Mutex<Option<Position>>,
    pub(crate) floor: Mutex<Option<Floor>>,
    /// When set, `authorize` fails.
    pub(crate) reject_authorization: Mutex<bool>,
}

impl RecordingEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push an event into every live subscription.
    pub(crate) fn emit(&self, event: EngineEvent) {
        self.bus.publish(&event);
    }

    pub(crate) fn applied_guidance(&self) -> Vec<GuidanceConfig> {
        self.guidance.lock().unwrap().clone()
    }

    pub(crate) fn applied_settings(&self) -> Vec<EngineSettings> {
        self.settings.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn authorize(&self, token: &str) -> Result<()> {
        if *self.reject_authorization.lock().unwrap() {
            return Err(Error::authorization("engine rejected the token"));
        }
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(())
    }

    async fn request_permissions(&self) -> Result<()> {
        *self.permission_requests.lock().unwrap() += 1;
        Ok(())
    }

    async fn start_sync(&self) -> Result<()> {
        *self.sync_requests.lock().unwrap() += 1;
        Ok(())
    }

    fn apply_settings(&self, settings: &EngineSettings) -> Result<()> {
        self.settings.lock().unwrap().push(settings.clone());
        Ok(())
    }

    fn apply_guidance(&self, guidance: &GuidanceConfig) -> Result<()> {
        self.guidance.lock().unwrap().push(guidance.clone());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<EngineEvent> {
        self.bus.subscribe()
    }

    async fn calculate_route(&self, request: &RouteRequest) -> Result<Option<Route>> {
        self.calculate_requests.lock().unwrap().push(request.clone());
        Ok(self.route_result.lock().unwrap().clone())
    }

    async fn preview_route(&self, request: &RouteRequest) -> Result<()> {
        self.preview_requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn start_navigation(&self) -> Result<()> {
        *self.navigation_starts.lock().unwrap() += 1;
        Ok(())
    }

    fn cancel_navigation(&self) -> Result<()> {
        *self.navigation_cancels.lock().unwrap() += 1;
        Ok(())
    }

    async fn features(&self) -> Result<Vec<Feature>> {
        Ok(self.venue_features.lock().unwrap().clone())
    }

    async fn amenities(&self) -> Result<Vec<Amenity>> {
        Ok(self.venue_amenities.lock().unwrap().clone())
    }

    async fn floors(&self) -> Result<Vec<Floor>> {
        Ok(self.venue_floors.lock().unwrap().clone())
    }

    fn current_position(&self) -> Option<Position> {
        *self.position.lock().unwrap()
    }

    fn current_floor(&self) -> Option<Floor> {
        self.floor.lock().unwrap().clone()
    }
}
