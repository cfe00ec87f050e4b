//! Address lookup through Mapbox Geocoding v5.

use geo::Coord;
use reqwest::Client;
use tokio::runtime::Runtime;
use url::Url;
use yardline_core::{GeocodeError, Geocoder, is_valid_coordinate};

use super::config::MapboxConfig;
use super::error::ProviderBuildError;
use super::http::{
    block_on, build_client, build_runtime, error_message, join_path, parse_base_url, with_token,
};
use super::response::GeocodingResponse;

/// [`Geocoder`] returning the most relevant Mapbox match.
pub struct MapboxGeocoder {
    client: Client,
    base_url: Url,
    token: String,
    runtime: Runtime,
}

impl std::fmt::Debug for MapboxGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxGeocoder")
            .field("client", &self.client)
            .field("base_url", &self.base_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl MapboxGeocoder {
    /// Build the geocoder. Only the token, base URL, timeout and user agent
    /// of `config` are used.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError::MissingCredentials`] when no token is
    /// configured, or an error if the base URL, HTTP client or runtime is
    /// unusable.
    pub fn new(config: &MapboxConfig) -> Result<Self, ProviderBuildError> {
        let token = config
            .token()
            .ok_or_else(ProviderBuildError::missing_token)?
            .to_owned();
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base_url(&config.base_url)?,
            token,
            runtime: build_runtime()?,
        })
    }

    /// `{base}/geocoding/v5/mapbox.places/{address}.json?limit=1`, without
    /// the access token.
    fn search_url(&self, address: &str) -> Url {
        let query = format!("{address}.json");
        let mut url = join_path(
            &self.base_url,
            ["geocoding", "v5", "mapbox.places", query.as_str()],
        );
        url.query_pairs_mut().append_pair("limit", "1");
        url
    }

    /// Look up `address` asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::EmptyAddress`] for a blank address,
    /// [`GeocodeError::NotFound`] when Mapbox has no match, and
    /// [`GeocodeError::Service`] for transport or decoding failures.
    pub async fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        let url = self.search_url(address);
        let service = |message: String| GeocodeError::Service { message };

        let response = self
            .client
            .get(with_token(&url, &self.token))
            .send()
            .await
            .map_err(|err| service(err.without_url().to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service(format!(
                "HTTP {} from {url}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }
        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|err| service(err.without_url().to_string()))?;
        first_match(address, body)
    }
}

fn first_match(address: &str, response: GeocodingResponse) -> Result<Coord<f64>, GeocodeError> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound {
            address: address.to_owned(),
        })?;
    let [x, y] = feature.center;
    let coord = Coord { x, y };
    if !is_valid_coordinate(coord) {
        return Err(GeocodeError::Service {
            message: format!("match for {address:?} has an invalid centre {x},{y}"),
        });
    }
    log::debug!(
        "geocoded {address:?} to {}",
        feature.place_name.as_deref().unwrap_or("unnamed place")
    );
    Ok(coord)
}

impl Geocoder for MapboxGeocoder {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        block_on(&self.runtime, self.lookup(address))
    }
}
