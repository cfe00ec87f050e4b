//! Mapbox API response types.
//!
//! See: <https://docs.mapbox.com/api/navigation/matrix/> and
//! <https://docs.mapbox.com/api/search/geocoding-v5/>

use serde::Deserialize;

/// Directions Matrix API response.
///
/// Rows follow the `sources` of the request and columns its
/// `destinations`. A `null` cell means no route was found.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    /// `"Ok"` on success, otherwise an error code such as `"NoRoute"`.
    pub code: String,

    /// Error text accompanying a non-`"Ok"` code.
    pub message: Option<String>,

    /// Travel durations in seconds.
    pub durations: Option<Vec<Vec<Option<f64>>>>,

    /// Travel distances in meters.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl MatrixResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// Geocoding v5 response. Only the fields read by the geocoder are kept.
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    /// Matches ordered by relevance.
    #[serde(default)]
    pub features: Vec<GeocodingFeature>,
}

/// One geocoding match.
#[derive(Debug, Deserialize)]
pub struct GeocodingFeature {
    /// `[longitude, latitude]` of the match.
    pub center: [f64; 2],
    /// Human-readable match description.
    #[serde(default)]
    pub place_name: Option<String>,
}
