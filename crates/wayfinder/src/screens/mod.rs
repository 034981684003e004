//! Headless screen models.
//!
//! Each screen of the app is represented by a view model that owns the
//! screen's state and update rules but does no rendering. The session feeds
//! engine events into these models; a UI layer (or the CLI) reads them.

pub mod map;
pub mod poi;
pub mod prefs;
pub mod search;

pub use map::MapViewState;
pub use poi::{DistanceEstimate, PoiDetail};
pub use prefs::PreferenceEditor;
pub use search::SearchModel;

use crate::venue::{display_level, LevelOverride};

/// Human-readable floor label for a physical level.
///
/// Goes through the display-level mapping first, so a venue that labels its
/// ground floor "0" shows that instead of the default "1".
#[must_use]
pub fn floor_label(physical: i32, overrides: &[LevelOverride]) -> String {
    let display = display_level(physical, overrides);
    if display < 0 {
        format!("Basement {}", -display)
    } else {
        format!("Floor {display}")
    }
}
