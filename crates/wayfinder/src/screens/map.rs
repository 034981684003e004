//! Map view model: camera follow state and the displayed floor.
//!
//! The displayed level and the user's level are deliberately decoupled. The
//! map keeps showing the floor the user picked until they recenter, and only
//! tracks live floor changes while the two are already in sync.

use crate::venue::{Floor, Geofence, Position};

/// State of the map screen camera and floor selection.
#[derive(Debug, Clone)]
pub struct MapViewState {
    covered_geofence_id: String,
    default_level: i32,
    follow_user: bool,
    follow_user_heading: bool,
    in_covered_area: bool,
    position: Option<Position>,
    map_level: i32,
    user_level: i32,
}

impl MapViewState {
    /// Create map state for a venue.
    ///
    /// `covered_geofence_id` names the geofence whose presence means the
    /// positioning engine covers the user's location; `default_level` is
    /// shown until the first floor change arrives.
    #[must_use]
    pub fn new(covered_geofence_id: impl Into<String>, default_level: i32) -> Self {
        Self {
            covered_geofence_id: covered_geofence_id.into(),
            default_level,
            follow_user: true,
            follow_user_heading: false,
            in_covered_area: false,
            position: None,
            map_level: default_level,
            user_level: default_level,
        }
    }

    /// Whether the camera tracks the user's position.
    #[must_use]
    pub fn follow_user(&self) -> bool {
        self.follow_user
    }

    /// Whether the camera also rotates with the user's heading.
    #[must_use]
    pub fn follow_user_heading(&self) -> bool {
        self.follow_user_heading
    }

    /// Whether the user is inside the covered area of the venue.
    #[must_use]
    pub fn in_covered_area(&self) -> bool {
        self.in_covered_area
    }

    /// Last known user position.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Level currently displayed on the map.
    #[must_use]
    pub fn map_level(&self) -> i32 {
        self.map_level
    }

    /// Level the positioning engine reports the user on.
    #[must_use]
    pub fn user_level(&self) -> i32 {
        self.user_level
    }

    /// Record a position update.
    ///
    /// Returns true when the camera should move to the new position: on the
    /// first fix, while following, or while inside the covered area.
    pub fn on_position_update(&mut self, position: Position) -> bool {
        let first_fix = self.position.is_none();
        self.position = Some(position);
        first_fix || self.follow_user || self.in_covered_area
    }

    /// Record a floor change from the engine.
    ///
    /// The displayed level follows the user's level only while the two are
    /// in sync; a manually selected floor stays put.
    pub fn on_floor_changed(&mut self, floor: Option<&Floor>) {
        let new_level = floor.map_or(self.default_level, |f| f.level);
        if self.map_level == self.user_level {
            self.map_level = new_level;
        }
        self.user_level = new_level;
    }

    /// Record entry into a geofence.
    pub fn on_geofence_entered(&mut self, geofence: &Geofence) {
        if geofence.id == self.covered_geofence_id {
            self.in_covered_area = true;
        }
    }

    /// Record exit from a geofence.
    pub fn on_geofence_exited(&mut self, geofence: &Geofence) {
        if geofence.id == self.covered_geofence_id {
            self.in_covered_area = false;
        }
    }

    /// Re-center the camera on the user.
    ///
    /// Only acts when a position is known and the user is inside the covered
    /// area; resumes following and syncs the displayed level to the user's.
    /// Returns whether the camera moved.
    pub fn recenter(&mut self) -> bool {
        if self.position.is_none() || !self.in_covered_area {
            return false;
        }
        self.follow_user = true;
        self.map_level = self.user_level;
        true
    }

    /// Toggle heading-follow mode.
    ///
    /// Turning it on also resumes position following; turning it off leaves
    /// position following as is.
    pub fn toggle_heading_follow(&mut self) {
        if self.follow_user_heading {
            self.follow_user_heading = false;
        } else {
            self.follow_user = true;
            self.follow_user_heading = true;
        }
    }

    /// The user started panning the map by hand. Drops both follow modes.
    pub fn begin_user_pan(&mut self) {
        self.follow_user = false;
        self.follow_user_heading = false;
    }

    /// Show a specific level, picked from the floor selector.
    pub fn select_level(&mut self, level: i32) {
        self.map_level = level;
    }
}
