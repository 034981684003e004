//! Route event normalization.
//!
//! The engine emits a raw stream of route updates while guiding. This module
//! reduces that stream into one coherent navigation state for the screens:
//! which route is active, whether guidance has started, what the latest
//! instruction is, and whether a terminal banner should be showing.
//!
//! The one piece of timing logic is instruction suppression: a
//! `DIRECTION_UPDATE` arriving hard on the heels of a `DIRECTION_NEW` is
//! dropped so the user gets a chance to read the new instruction before it
//! is overwritten.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::route::{Route, RouteEvent, RouteEventKind};
use crate::venue::Feature;

/// How long a fresh `DIRECTION_NEW` instruction is protected from being
/// overwritten by a `DIRECTION_UPDATE`.
pub const DEFAULT_SUPPRESSION_WINDOW: Duration = Duration::from_millis(4000);

/// Navigation state derived from the engine's route events.
///
/// Snapshots of this are what the screens observe; all mutation goes
/// through [`RouteEventNormalizer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    route: Option<Route>,
    last_update: Option<RouteEvent>,
    started: bool,
    hazard: Option<Feature>,
    segment: Option<Feature>,
}

impl NavigationState {
    /// The active (or previewed) route, if any.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// The latest stored route update, terminal banners included.
    #[must_use]
    pub fn last_update(&self) -> Option<&RouteEvent> {
        self.last_update.as_ref()
    }

    /// Whether live guidance is running.
    ///
    /// True only once guidance has started and a route is present, so a
    /// `DIRECTION_NEW` that outruns its `RouteComputed` event on the channel
    /// does not flicker guidance on early.
    #[must_use]
    pub fn started(&self) -> bool {
        self.started && self.route.is_some()
    }

    /// The instruction text to display while navigating.
    #[must_use]
    pub fn instruction(&self) -> Option<&str> {
        if !self.started() {
            return None;
        }
        match &self.last_update {
            Some(update) if !update.is_terminal() => Some(update.text.as_str()),
            _ => None,
        }
    }

    /// Whether a terminal end-state banner is waiting to be dismissed.
    #[must_use]
    pub fn has_terminal_banner(&self) -> bool {
        self.last_update.as_ref().is_some_and(RouteEvent::is_terminal)
    }

    /// The hazard the user was last warned about, if any.
    #[must_use]
    pub fn hazard(&self) -> Option<&Feature> {
        self.hazard.as_ref()
    }

    /// The named area the user is currently inside, if any.
    #[must_use]
    pub fn segment(&self) -> Option<&Feature> {
        self.segment.as_ref()
    }
}

/// What the normalizer did with a route update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The event was stored into the navigation state.
    Applied {
        /// The map should re-center on the user (route computation began).
        recenter: bool,
    },
    /// The event was dropped by the suppression rule; state is unchanged.
    Suppressed,
}

/// Reduces the engine's route event stream into [`NavigationState`].
#[derive(Debug)]
pub struct RouteEventNormalizer {
    state: NavigationState,
    suppression_window: Duration,
    last_update_at: Option<Instant>,
}

impl Default for RouteEventNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION_WINDOW)
    }
}

impl RouteEventNormalizer {
    /// Create a normalizer with the given suppression window.
    #[must_use]
    pub fn new(suppression_window: Duration) -> Self {
        Self {
            state: NavigationState::default(),
            suppression_window,
            last_update_at: None,
        }
    }

    /// The current navigation state.
    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// A clone of the current state, for broadcasting.
    #[must_use]
    pub fn snapshot(&self) -> NavigationState {
        self.state.clone()
    }

    /// A computed route arrived: replace the stored route.
    ///
    /// Whether guidance is running is not affected; a preview delivers a
    /// route long before the user starts it.
    pub fn on_route(&mut self, route: Route) {
        debug!(destination = %route.destination.title, "route stored");
        self.state.route = Some(route);
    }

    /// Reduce a route update using the current time.
    pub fn on_route_update(&mut self, event: RouteEvent) -> UpdateOutcome {
        self.on_route_update_at(event, Instant::now())
    }

    /// Reduce a route update as of an explicit instant.
    ///
    /// The suppression window is measured between `now` values passed here,
    /// which keeps the rule testable without sleeping.
    pub fn on_route_update_at(&mut self, event: RouteEvent, now: Instant) -> UpdateOutcome {
        match event.kind {
            RouteEventKind::Calculating => {
                // A fresh calculation has nothing to show yet.
                self.state.route = None;
                self.state.started = false;
                self.store(event, now);
                UpdateOutcome::Applied { recenter: true }
            }
            RouteEventKind::Recalculating => {
                // Keep the stale route on screen until its replacement
                // arrives.
                self.state.started = false;
                self.store(event, now);
                UpdateOutcome::Applied { recenter: true }
            }
            RouteEventKind::DirectionNew => {
                self.state.started = true;
                self.store(event, now);
                UpdateOutcome::Applied { recenter: false }
            }
            RouteEventKind::DirectionUpdate => {
                if self.within_suppression_window(now) {
                    debug!("direction update suppressed");
                    return UpdateOutcome::Suppressed;
                }
                self.state.started = true;
                self.store(event, now);
                UpdateOutcome::Applied { recenter: false }
            }
            RouteEventKind::Finished
            | RouteEventKind::Canceled
            | RouteEventKind::RouteNotFound
            | RouteEventKind::RouteNetworkError => {
                debug!(kind = %event.kind, "guidance ended");
                self.state.route = None;
                self.state.started = false;
                self.store(event, now);
                UpdateOutcome::Applied { recenter: false }
            }
        }
    }

    /// Whether a `DIRECTION_UPDATE` at `now` would overwrite a
    /// `DIRECTION_NEW` that is still being read.
    fn within_suppression_window(&self, now: Instant) -> bool {
        let Some(last) = &self.state.last_update else {
            return false;
        };
        let Some(at) = self.last_update_at else {
            return false;
        };
        last.kind == RouteEventKind::DirectionNew
            && now.saturating_duration_since(at) < self.suppression_window
    }

    fn store(&mut self, event: RouteEvent, now: Instant) {
        self.state.last_update = Some(event);
        self.last_update_at = Some(now);
    }

    /// A hazard warning fired: remember it for the advisory overlay.
    pub fn on_hazard(&mut self, feature: Feature) {
        self.state.hazard = Some(feature);
    }

    /// The user entered a named area.
    pub fn on_segment_entered(&mut self, feature: Feature) {
        self.state.segment = Some(feature);
    }

    /// The user left the current named area.
    pub fn on_segment_exited(&mut self) {
        self.state.segment = None;
    }

    /// Dismiss the end-state banner and clear route state.
    ///
    /// Advisory overlays (hazard, segment) are independent streams and stay
    /// as they are.
    pub fn dismiss(&mut self) {
        self.state.route = None;
        self.state.last_update = None;
        self.state.started = false;
        self.last_update_at = None;
    }
}
