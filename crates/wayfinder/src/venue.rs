//! Venue data model: features, amenities, floors, geofences and the
//! geographic helpers the guidance layer needs.
//!
//! These are the engine-owned entities the rest of the crate consumes. They
//! are plain serde values so a real engine can deliver them over any
//! transport; the simulated engine constructs them directly.

use serde::{Deserialize, Serialize};

/// Mean earth radius used for haversine distances, in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Position {
    /// Create a position from latitude and longitude in degrees.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to another position, in meters.
    #[must_use]
    pub fn distance_m(&self, other: &Position) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Initial bearing toward another position, in degrees within
    /// (-180, 180], where 0 is north and positive values turn east.
    #[must_use]
    pub fn bearing_to(&self, other: &Position) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let y = dlng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
        y.atan2(x).to_degrees()
    }
}

/// Eight-way compass direction derived from a bearing.
///
/// Spoken guidance and the map camera both quantize bearings into these
/// points; [`CompassPoint::rotation_degrees`] is the camera rotation that
/// puts the point straight ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassPoint {
    /// Bearing within 22.5 degrees of north.
    North,
    /// Bearing between 22.5 and 67.5 degrees.
    NorthEast,
    /// Bearing between 67.5 and 112.5 degrees.
    East,
    /// Bearing between 112.5 and 157.5 degrees.
    SouthEast,
    /// Bearing beyond 157.5 degrees either way.
    South,
    /// Bearing between -157.5 and -112.5 degrees.
    SouthWest,
    /// Bearing between -112.5 and -67.5 degrees.
    West,
    /// Bearing between -67.5 and -22.5 degrees.
    NorthWest,
}

impl CompassPoint {
    /// Quantize a bearing in degrees into a compass point.
    ///
    /// Accepts any finite bearing; values are normalized into (-180, 180]
    /// first.
    #[must_use]
    pub fn from_bearing(degrees: f64) -> Self {
        let mut d = degrees % 360.0;
        if d > 180.0 {
            d -= 360.0;
        } else if d <= -180.0 {
            d += 360.0;
        }

        if (-22.5..22.5).contains(&d) {
            Self::North
        } else if (22.5..67.5).contains(&d) {
            Self::NorthEast
        } else if (67.5..112.5).contains(&d) {
            Self::East
        } else if (112.5..157.5).contains(&d) {
            Self::SouthEast
        } else if (-67.5..-22.5).contains(&d) {
            Self::NorthWest
        } else if (-112.5..-67.5).contains(&d) {
            Self::West
        } else if (-157.5..-112.5).contains(&d) {
            Self::SouthWest
        } else {
            Self::South
        }
    }

    /// Camera rotation, in degrees, that aligns this point with "ahead".
    #[must_use]
    pub fn rotation_degrees(&self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::NorthEast => 45.0,
            Self::East => 90.0,
            Self::SouthEast => 135.0,
            Self::South => 180.0,
            Self::SouthWest => -135.0,
            Self::West => -90.0,
            Self::NorthWest => -45.0,
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
        };
        write!(f, "{name}")
    }
}

/// What a venue feature represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// A searchable, routable point of interest.
    Poi,
    /// A hazard the guidance layer warns about when nearby.
    Hazard,
    /// A named semantic area (wing, zone) announced on entry.
    Segment,
    /// A visual landmark referenced by spoken guidance.
    Landmark,
}

/// A venue feature as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable feature identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Feature classification.
    pub kind: FeatureKind,
    /// Physical level the feature is on.
    pub level: i32,
    /// Location of the feature.
    pub position: Position,
    /// Amenity this feature belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenity_id: Option<String>,
    /// Optional longer description shown on the detail screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Feature {
    /// Whether this feature shows up in point-of-interest search.
    #[must_use]
    pub fn is_poi(&self) -> bool {
        self.kind == FeatureKind::Poi
    }
}

/// An amenity category a feature can belong to (cafe, restroom, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    /// Stable amenity identifier.
    pub id: String,
    /// Category grouping used by search filters.
    pub category_id: String,
    /// Human-readable title.
    pub title: String,
}

/// A floor of the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    /// Stable floor identifier.
    pub id: String,
    /// Physical level number.
    pub level: i32,
    /// Display name.
    pub name: String,
}

/// A named geofenced region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geofence {
    /// Stable geofence identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A single entry of the display-level override table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOverride {
    /// Physical level reported by the engine.
    pub physical: i32,
    /// Level number shown to the user.
    pub display: i32,
}

/// Map a physical level to its displayed floor number.
///
/// Venues commonly label the ground floor "1", so levels at or above zero
/// shift up by one while basement levels keep their physical number. The
/// override table wins where it has an entry.
#[must_use]
pub fn display_level(physical: i32, overrides: &[LevelOverride]) -> i32 {
    if let Some(entry) = overrides.iter().find(|o| o.physical == physical) {
        return entry.display;
    }
    if physical < 0 {
        physical
    } else {
        physical + 1
    }
}
