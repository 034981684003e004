//! POI detail screen model.

use tracing::debug;

use crate::engine::Engine;
use crate::route::{RouteOptions, RouteRequest};
use crate::screens::floor_label;
use crate::units::{format_distance, DistanceUnit};
use crate::venue::{Feature, LevelOverride};

/// Progress of the walking-distance preview on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceEstimate {
    /// The preview calculation has not resolved yet.
    Pending,
    /// The engine could not produce a route to this feature.
    Unavailable,
    /// Route found; walking distance in meters.
    Distance(f64),
}

/// Detail view of a single point of interest.
///
/// Shows the feature's metadata immediately and fills in the distance
/// preview once the engine resolves a route. The preview uses default route
/// options; avoidance preferences only apply when the trip actually starts.
#[derive(Debug, Clone)]
pub struct PoiDetail {
    feature: Feature,
    estimate: DistanceEstimate,
}

impl PoiDetail {
    /// Open the detail view for a feature.
    #[must_use]
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            estimate: DistanceEstimate::Pending,
        }
    }

    /// Resolve the distance preview through the engine.
    ///
    /// A failed or empty calculation degrades to
    /// [`DistanceEstimate::Unavailable`]; it never surfaces as an error.
    pub async fn load(&mut self, engine: &dyn Engine) {
        let request = RouteRequest::new(&self.feature.id, RouteOptions::default());
        self.estimate = match engine.calculate_route(&request).await {
            Ok(Some(route)) => DistanceEstimate::Distance(route.distance_m),
            Ok(None) => DistanceEstimate::Unavailable,
            Err(err) => {
                debug!("distance preview failed for {}: {err}", self.feature.id);
                DistanceEstimate::Unavailable
            }
        };
    }

    /// The feature on display.
    #[must_use]
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Screen title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.feature.title
    }

    /// Description, or a placeholder when the feature has none.
    #[must_use]
    pub fn description_text(&self) -> &str {
        self.feature
            .description
            .as_deref()
            .unwrap_or("No description available.")
    }

    /// Floor line, through the venue's display-level table.
    #[must_use]
    pub fn floor_text(&self, overrides: &[LevelOverride]) -> String {
        floor_label(self.feature.level, overrides)
    }

    /// Current state of the distance preview.
    #[must_use]
    pub fn estimate(&self) -> DistanceEstimate {
        self.estimate
    }

    /// Distance preview as a step count, or a progress/failure line.
    #[must_use]
    pub fn steps_text(&self) -> String {
        match self.estimate {
            DistanceEstimate::Pending => "Calculating steps...".to_string(),
            DistanceEstimate::Unavailable => "Could not calculate steps".to_string(),
            DistanceEstimate::Distance(m) => format_distance(m, DistanceUnit::Steps),
        }
    }
}
