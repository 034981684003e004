//! The built-in demo venue.
//!
//! A small three-floor shopping center laid out around real coordinates, with
//! enough variety to exercise every part of the navigation pipeline: points
//! of interest on every floor, a hazard on a walking path, a named wing, and
//! level connectors with different reachability.

use wayfinder::venue::{Amenity, Feature, FeatureKind, Floor, Geofence, Position};

/// Geofence id of the area with indoor positioning coverage.
///
/// Matches the app config's default `covered_geofence_id`.
pub const COVERAGE_GEOFENCE_ID: &str = "covered-area";

/// How a connector moves people between floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// A staircase.
    Stairs,
    /// An elevator.
    Elevator,
}

/// A vertical connector between floors.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// What kind of connector this is.
    pub kind: ConnectorKind,
    /// Where the connector is entered.
    pub position: Position,
    /// Physical levels the connector serves.
    pub levels: Vec<i32>,
}

impl Connector {
    /// Whether the connector stops at a level.
    #[must_use]
    pub fn serves(&self, level: i32) -> bool {
        self.levels.contains(&level)
    }
}

/// A complete simulated venue.
#[derive(Debug, Clone)]
pub struct SimVenue {
    /// Display name of the venue.
    pub name: String,
    /// Where a visitor enters (and where positioning first fixes).
    pub entrance: Position,
    /// Floors of the building, in ascending level order.
    pub floors: Vec<Floor>,
    /// Every feature: POIs, hazards, segments and landmarks.
    pub features: Vec<Feature>,
    /// Amenity categories the POIs belong to.
    pub amenities: Vec<Amenity>,
    /// The geofence covering the positioned area.
    pub coverage: Geofence,
    /// Vertical connectors between floors.
    pub connectors: Vec<Connector>,
}

impl SimVenue {
    /// Build the demo venue.
    ///
    /// The eye clinic on level 2 is reachable by stairs only; routing there
    /// with stairs avoided has no answer, which is deliberate.
    #[must_use]
    pub fn demo() -> Self {
        let entrance = Position::new(60.1700, 24.9380);

        let floors = vec![
            floor("floor-0", 0, "Ground Floor"),
            floor("floor-1", 1, "First Floor"),
            floor("floor-2", 2, "Second Floor"),
        ];

        let amenities = vec![
            amenity("am-food", "cat-food", "Food & Drink"),
            amenity("am-health", "cat-health", "Health"),
            amenity("am-retail", "cat-retail", "Shopping"),
            amenity("am-service", "cat-service", "Services"),
        ];

        let features = vec![
            poi(
                "poi-info",
                "Information Desk",
                0,
                offset(entrance, 10.0, 5.0),
                "am-service",
                Some("Staffed desk by the main entrance."),
            ),
            poi(
                "poi-cafe",
                "Cafe Aurora",
                0,
                offset(entrance, 45.0, 40.0),
                "am-food",
                Some("Coffee, pastries and light lunches in the east wing."),
            ),
            poi(
                "poi-restrooms",
                "Restrooms",
                0,
                offset(entrance, 25.0, -15.0),
                "am-service",
                None,
            ),
            poi(
                "poi-pharmacy",
                "Pharmacy",
                1,
                offset(entrance, 30.0, 20.0),
                "am-health",
                Some("Prescriptions and over-the-counter medicine."),
            ),
            poi(
                "poi-bookstore",
                "Bookstore",
                1,
                offset(entrance, 50.0, -10.0),
                "am-retail",
                None,
            ),
            poi(
                "poi-clinic",
                "Eye Clinic",
                2,
                offset(entrance, 35.0, 30.0),
                "am-health",
                Some("Walk-in eye examinations on the top floor."),
            ),
            feature(
                "hz-wet-floor",
                "Wet floor by the fountain",
                FeatureKind::Hazard,
                0,
                offset(entrance, 22.0, 20.0),
            ),
            feature(
                "seg-east-wing",
                "East Wing",
                FeatureKind::Segment,
                0,
                offset(entrance, 40.0, 35.0),
            ),
            feature(
                "lm-fountain",
                "Fountain",
                FeatureKind::Landmark,
                0,
                offset(entrance, 20.0, 18.0),
            ),
        ];

        let connectors = vec![
            Connector {
                kind: ConnectorKind::Stairs,
                position: offset(entrance, 15.0, 25.0),
                levels: vec![0, 1, 2],
            },
            Connector {
                kind: ConnectorKind::Elevator,
                position: offset(entrance, 18.0, -8.0),
                levels: vec![0, 1],
            },
        ];

        Self {
            name: "Aurora Center".to_string(),
            entrance,
            floors,
            features,
            amenities,
            coverage: Geofence {
                id: COVERAGE_GEOFENCE_ID.to_string(),
                name: "Aurora Center".to_string(),
            },
            connectors,
        }
    }

    /// Look up a feature by id.
    #[must_use]
    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Look up a floor by physical level.
    #[must_use]
    pub fn floor(&self, level: i32) -> Option<&Floor> {
        self.floors.iter().find(|f| f.level == level)
    }

    /// All features of one kind on one level.
    pub fn features_of_kind(&self, kind: FeatureKind, level: i32) -> impl Iterator<Item = &Feature> {
        self.features
            .iter()
            .filter(move |f| f.kind == kind && f.level == level)
    }
}

/// Shift a position by meters north and east.
///
/// Good enough at venue scale; one degree of latitude is taken as 111.32 km
/// and longitude is corrected by the latitude's cosine.
#[must_use]
pub fn offset(base: Position, north_m: f64, east_m: f64) -> Position {
    const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
    let lat = base.lat + north_m / METERS_PER_DEGREE_LAT;
    let lng = base.lng + east_m / (METERS_PER_DEGREE_LAT * base.lat.to_radians().cos());
    Position::new(lat, lng)
}

fn floor(id: &str, level: i32, name: &str) -> Floor {
    Floor {
        id: id.to_string(),
        level,
        name: name.to_string(),
    }
}

fn amenity(id: &str, category_id: &str, title: &str) -> Amenity {
    Amenity {
        id: id.to_string(),
        category_id: category_id.to_string(),
        title: title.to_string(),
    }
}

fn poi(
    id: &str,
    title: &str,
    level: i32,
    position: Position,
    amenity_id: &str,
    description: Option<&str>,
) -> Feature {
    Feature {
        id: id.to_string(),
        title: title.to_string(),
        kind: FeatureKind::Poi,
        level,
        position,
        amenity_id: Some(amenity_id.to_string()),
        description: description.map(str::to_string),
    }
}

fn feature(id: &str, title: &str, kind: FeatureKind, level: i32, position: Position) -> Feature {
    Feature {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        level,
        position,
        amenity_id: None,
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_feature_ids_are_unique() {
        let venue = SimVenue::demo();
        let mut ids: Vec<&str> = venue.features.iter().map(|f| f.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_demo_poi_amenities_resolve() {
        let venue = SimVenue::demo();
        for feature in venue.features.iter().filter(|f| f.is_poi()) {
            let amenity_id = feature.amenity_id.as_deref().expect("POI without amenity");
            assert!(
                venue.amenities.iter().any(|a| a.id == amenity_id),
                "dangling amenity {amenity_id} on {}",
                feature.id
            );
        }
    }

    #[test]
    fn test_demo_has_poi_on_every_floor() {
        let venue = SimVenue::demo();
        for floor in &venue.floors {
            assert!(
                venue.features.iter().any(|f| f.is_poi() && f.level == floor.level),
                "no POI on level {}",
                floor.level
            );
        }
    }

    #[test]
    fn test_demo_feature_levels_exist() {
        let venue = SimVenue::demo();
        for feature in &venue.features {
            assert!(
                venue.floor(feature.level).is_some(),
                "feature {} on unknown level {}",
                feature.id,
                feature.level
            );
        }
    }

    #[test]
    fn test_demo_top_floor_is_stairs_only() {
        let venue = SimVenue::demo();
        let serving: Vec<_> = venue.connectors.iter().filter(|c| c.serves(2)).collect();
        assert!(!serving.is_empty());
        assert!(serving.iter().all(|c| c.kind == ConnectorKind::Stairs));
    }

    #[test]
    fn test_offset_distances() {
        let base = Position::new(60.17, 24.938);
        let moved = offset(base, 45.0, 40.0);
        let d = base.distance_m(&moved);
        // North and east legs combine to roughly 60 m.
        assert!((d - (45.0f64.powi(2) + 40.0f64.powi(2)).sqrt()).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_coverage_geofence_id() {
        assert_eq!(SimVenue::demo().coverage.id, COVERAGE_GEOFENCE_ID);
    }

    #[test]
    fn test_features_of_kind() {
        let venue = SimVenue::demo();
        let hazards: Vec<_> = venue.features_of_kind(FeatureKind::Hazard, 0).collect();
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].id, "hz-wet-floor");
        assert_eq!(venue.features_of_kind(FeatureKind::Hazard, 1).count(), 0);
    }
}
