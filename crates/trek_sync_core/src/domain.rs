//! crates/trek_sync_core/src/domain.rs
//!
//! Defines the core data structures shared by every store.
//! Treks are immutable server snapshots; the client only ever replaces them
//! wholesale on re-fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned trek identifier.
pub type TrekId = u64;
/// Server-assigned user identifier.
pub type UserId = u64;
/// Server-assigned identifier of a favorite join record.
pub type FavoriteId = u64;

//=========================================================================================
// Catalog Entities
//=========================================================================================

/// A catalogued hiking itinerary.
///
/// Every field except `id` falls back to its default when the server omits it
/// or sends `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trek {
    pub id: TrekId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elevation_profile: ElevationProfile,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub historical_significance: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary_points: Vec<ItineraryPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost_breakdown: CostBreakdown,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transportation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nearby_attractions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_permits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_gear: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub safety_info: SafetyInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_seasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub max_elevation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub min_elevation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBreakdown {
    #[serde(deserialize_with = "null_as_default")]
    pub permits: String,
    #[serde(deserialize_with = "null_as_default")]
    pub guide: String,
    #[serde(deserialize_with = "null_as_default")]
    pub porter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub accommodation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub food: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub altitude_sickness_risk: String,
}

/// A named stop on the trek route, used for map display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryPoint {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lng: f64,
}

/// Reads a nullable column as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

//=========================================================================================
// Account Entities
//=========================================================================================

/// The normalized profile of the signed-in user.
///
/// `interests` is `None` until the onboarding survey has been answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

// Only sent to the login endpoint - contains sensitive data
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The body of a signup request.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// The subset of session state that survives process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub saved_at: DateTime<Utc>,
}
