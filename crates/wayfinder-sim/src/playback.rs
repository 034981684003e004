//! Guidance playback.
//!
//! A trip is precomputed into a list of frames, one per simulated stride
//! along the route. Each frame carries the position reached and the events
//! to publish there. Building the script is pure and synchronous so the
//! event sequence of any route can be asserted without timing; [`run`]
//! plays the frames back on a tokio task with a configurable tick.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;
use wayfinder::bus::EventBus;
use wayfinder::engine::{EngineEvent, GuidanceConfig};
use wayfinder::route::{Route, RouteEvent, RouteEventKind, RouteStep, StepDirection};
use wayfinder::units::{self, UnitConversion};
use wayfinder::venue::{Feature, FeatureKind, Position};

use crate::engine::{lock, SimState};
use crate::venue::SimVenue;

/// One tick of a simulated trip.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) position: Position,
    pub(crate) level: i32,
    pub(crate) events: Vec<EngineEvent>,
}

/// Inputs for building a playback script.
#[derive(Debug)]
pub(crate) struct ScriptParams<'a> {
    pub(crate) venue: &'a SimVenue,
    pub(crate) guidance: Option<&'a GuidanceConfig>,
    pub(crate) stride_m: f64,
    pub(crate) hazard_radius_m: f64,
    pub(crate) segment_radius_m: f64,
}

/// Precompute the frames of a trip along `route`.
///
/// The first frame announces the route's first instruction; the last frame
/// carries the `FINISHED` update. Spoken distances use the unit table from
/// the applied guidance configuration, metric when none was pushed.
pub(crate) fn build_script(route: &Route, params: &ScriptParams<'_>) -> Vec<Frame> {
    let table = params
        .guidance
        .map_or_else(UnitConversion::meters, |g| g.unit_table.clone());
    let stride = params.stride_m.max(0.1);
    let mut tracker = ProximityTracker::new(params.hazard_radius_m, params.segment_radius_m);
    let mut frames = Vec::new();

    let steps = &route.steps;
    let Some(first) = steps.first() else {
        return frames;
    };

    let mut pos = first.position;
    let mut level = first.level;
    frames.push(frame_at(
        pos,
        level,
        vec![direction_new(first)],
        &mut tracker,
        params.venue,
    ));

    for step in steps.iter().skip(1) {
        let leg = pos.distance_m(&step.position);
        let count = (leg / stride) as usize;
        for k in 1..=count {
            let walked = k as f64 * stride;
            let t = walked / leg;
            if t >= 1.0 {
                break;
            }
            let here = lerp(pos, step.position, t);
            let text = update_text(&table, leg - walked, step);
            frames.push(frame_at(
                here,
                level,
                vec![EngineEvent::RouteUpdate(RouteEvent::new(
                    RouteEventKind::DirectionUpdate,
                    text,
                ))],
                &mut tracker,
                params.venue,
            ));
        }

        let mut events = Vec::new();
        if step.direction == StepDirection::Finish {
            events.push(EngineEvent::RouteUpdate(RouteEvent::new(
                RouteEventKind::Finished,
                step.instruction.clone(),
            )));
        } else {
            events.push(direction_new(step));
        }
        if step.direction.is_level_change() {
            level = step.level;
            if let Some(floor) = params.venue.floor(level) {
                events.push(EngineEvent::FloorChanged(Some(floor.clone())));
            }
        }
        pos = step.position;
        frames.push(frame_at(pos, level, events, &mut tracker, params.venue));
    }

    frames
}

/// Play a script against the event bus.
///
/// The shared state's position and level track the frames so the engine's
/// snapshot accessors agree with the published events. A raised cancel flag
/// ends the trip with a `CANCELED` update at the next tick.
pub(crate) async fn run(
    bus: EventBus<EngineEvent>,
    state: Arc<Mutex<SimState>>,
    frames: Vec<Frame>,
    tick: Duration,
    cancel: Arc<AtomicBool>,
) {
    for frame in frames {
        if cancel.load(Ordering::SeqCst) {
            bus.publish(&EngineEvent::RouteUpdate(RouteEvent::new(
                RouteEventKind::Canceled,
                "Route canceled",
            )));
            finish(&state);
            debug!("guidance playback canceled");
            return;
        }

        {
            let mut state = lock(&state);
            state.position = Some(frame.position);
            state.level = Some(frame.level);
        }
        for event in &frame.events {
            bus.publish(event);
        }

        sleep(tick).await;
    }
    finish(&state);
    debug!("guidance playback finished");
}

fn finish(state: &Mutex<SimState>) {
    let mut state = lock(state);
    state.route = None;
    state.navigating = false;
    state.cancel = None;
}

/// Interpolate between two positions.
pub(crate) fn lerp(a: Position, b: Position, t: f64) -> Position {
    Position::new(a.lat + (b.lat - a.lat) * t, a.lng + (b.lng - a.lng) * t)
}

fn direction_new(step: &RouteStep) -> EngineEvent {
    EngineEvent::RouteUpdate(RouteEvent::new(
        RouteEventKind::DirectionNew,
        step.instruction.clone(),
    ))
}

fn update_text(table: &UnitConversion, remaining_m: f64, step: &RouteStep) -> String {
    let distance = units::format_with(table, remaining_m.max(0.0));
    if step.direction == StepDirection::Finish {
        format!("In {distance}, you will arrive at your destination")
    } else {
        format!("In {distance}, {}", lowercase_first(&step.instruction))
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn frame_at(
    position: Position,
    level: i32,
    mut extra: Vec<EngineEvent>,
    tracker: &mut ProximityTracker,
    venue: &SimVenue,
) -> Frame {
    let mut events = vec![EngineEvent::PositionUpdated(position)];
    events.append(&mut extra);
    events.extend(tracker.events_at(venue, position, level));
    Frame {
        position,
        level,
        events,
    }
}

/// Tracks which hazards were already warned about and which named area the
/// simulated walker is inside.
#[derive(Debug)]
struct ProximityTracker {
    hazard_radius_m: f64,
    segment_radius_m: f64,
    warned_hazards: HashSet<String>,
    current_segment: Option<Feature>,
}

impl ProximityTracker {
    fn new(hazard_radius_m: f64, segment_radius_m: f64) -> Self {
        Self {
            hazard_radius_m,
            segment_radius_m,
            warned_hazards: HashSet::new(),
            current_segment: None,
        }
    }

    fn events_at(&mut self, venue: &SimVenue, position: Position, level: i32) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        for hazard in venue.features_of_kind(FeatureKind::Hazard, level) {
            if position.distance_m(&hazard.position) <= self.hazard_radius_m
                && self.warned_hazards.insert(hazard.id.clone())
            {
                events.push(EngineEvent::HazardEntered(hazard.clone()));
            }
        }

        let inside = venue
            .features_of_kind(FeatureKind::Segment, level)
            .filter(|s| position.distance_m(&s.position) <= self.segment_radius_m)
            .min_by(|a, b| {
                position
                    .distance_m(&a.position)
                    .total_cmp(&position.distance_m(&b.position))
            })
            .cloned();

        match (&self.current_segment, &inside) {
            (None, Some(next)) => {
                events.push(EngineEvent::SegmentEntered(next.clone()));
            }
            (Some(prev), None) => {
                events.push(EngineEvent::SegmentExited(prev.clone()));
            }
            (Some(prev), Some(next)) if prev.id != next.id => {
                events.push(EngineEvent::SegmentExited(prev.clone()));
                events.push(EngineEvent::SegmentEntered(next.clone()));
            }
            _ => {}
        }
        self.current_segment = inside;

        events
    }
}
