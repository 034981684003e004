//! Search screen model: point-of-interest filtering.

use std::collections::HashMap;

use crate::venue::{Amenity, Feature};

/// Filterable list of the venue's points of interest.
///
/// Holds every POI the engine reported, sorted by title, and applies a
/// case-insensitive title filter and an optional amenity-category filter on
/// top. Refreshed whenever the engine signals changed venue data.
#[derive(Debug, Clone, Default)]
pub struct SearchModel {
    features: Vec<Feature>,
    amenities: HashMap<String, Amenity>,
    query: String,
    category: Option<String>,
}

impl SearchModel {
    /// Create an empty search model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feature list with fresh venue data.
    ///
    /// Keeps only POI features, sorted by title.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        let mut pois: Vec<Feature> = features.into_iter().filter(Feature::is_poi).collect();
        pois.sort_by(|a, b| a.title.cmp(&b.title));
        self.features = pois;
    }

    /// Replace the amenity list with fresh venue data.
    pub fn set_amenities(&mut self, amenities: Vec<Amenity>) {
        self.amenities = amenities.into_iter().map(|a| (a.id.clone(), a)).collect();
    }

    /// Set the title filter. Empty matches everything.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Set or clear the amenity-category filter.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    /// Drop both filters.
    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.category = None;
    }

    /// Current title filter.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current category filter.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// POIs matching the current filters, in title order.
    #[must_use]
    pub fn results(&self) -> Vec<&Feature> {
        self.features
            .iter()
            .filter(|f| self.matches(f))
            .collect()
    }

    /// Number of POIs matching the current filters.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.features.iter().filter(|f| self.matches(f)).count()
    }

    fn matches(&self, feature: &Feature) -> bool {
        if let Some(category) = &self.category {
            let amenity = feature
                .amenity_id
                .as_ref()
                .and_then(|id| self.amenities.get(id));
            match amenity {
                Some(a) if a.category_id == *category => {}
                _ => return false,
            }
        }

        self.query.is_empty()
            || feature
                .title
                .to_lowercase()
                .contains(&self.query.to_lowercase())
    }
}
