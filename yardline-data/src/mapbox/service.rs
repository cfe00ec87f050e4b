//! The block-request seam and its Directions Matrix implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;
use yardline_core::MatrixError;

use super::chunk::{BlockMatrix, BlockRequest};
use super::config::MapboxConfig;
use super::error::ProviderBuildError;
use super::http::{
    build_client, convert_reqwest_error, error_message, join_path, parse_base_url, with_token,
};
use super::response::MatrixResponse;

/// Answers a single [`BlockRequest`].
///
/// [`crate::mapbox::MapboxMatrixProvider`] drives many of these calls
/// concurrently, so implementations must tolerate overlapping requests.
#[async_trait]
pub trait MatrixService: Send + Sync {
    /// Fetch durations and distances for one block.
    ///
    /// # Errors
    ///
    /// Any failure is confined to this block; the caller leaves its cells
    /// absent.
    async fn fetch_block(&self, request: &BlockRequest) -> Result<BlockMatrix, MatrixError>;
}

#[async_trait]
impl<T: MatrixService + ?Sized> MatrixService for &T {
    async fn fetch_block(&self, request: &BlockRequest) -> Result<BlockMatrix, MatrixError> {
        (**self).fetch_block(request).await
    }
}

/// [`MatrixService`] backed by the Mapbox Directions Matrix API.
///
/// Requests answered with HTTP 429 are retried after
/// [`MapboxConfig::retry_backoff`], up to
/// [`MapboxConfig::rate_limit_retries`] times. URLs in errors never carry
/// the access token.
pub struct HttpMatrixService {
    client: Client,
    base_url: Url,
    token: String,
    config: MapboxConfig,
}

impl std::fmt::Debug for HttpMatrixService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMatrixService")
            .field("client", &self.client)
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpMatrixService {
    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError::MissingCredentials`] when no token is
    /// configured, or an error if the base URL or HTTP client is unusable.
    pub fn new(config: MapboxConfig) -> Result<Self, ProviderBuildError> {
        let token = config
            .token()
            .ok_or_else(ProviderBuildError::missing_token)?
            .to_owned();
        let base_url = parse_base_url(&config.base_url)?;
        let client = build_client(&config)?;
        Ok(Self {
            client,
            base_url,
            token,
            config,
        })
    }

    /// Request URL for `request`, without the access token.
    ///
    /// The format is
    /// `{base}/directions-matrix/v1/mapbox/{profile}/{lng,lat;...}` with
    /// `sources`, `destinations` and `annotations` query parameters.
    fn block_url(&self, request: &BlockRequest) -> Url {
        let coordinates = request
            .coordinates
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(";");
        let mut url = join_path(
            &self.base_url,
            [
                "directions-matrix",
                "v1",
                "mapbox",
                self.config.profile.as_str(),
                coordinates.as_str(),
            ],
        );
        url.query_pairs_mut()
            .append_pair("annotations", "duration,distance")
            .append_pair("sources", &join_indices(request.source_positions()))
            .append_pair(
                "destinations",
                &join_indices(request.destination_positions()),
            );
        url
    }

    async fn fetch_once(&self, url: &Url, shown: &str) -> Result<Attempt, MatrixError> {
        let timeout_secs = self.config.timeout.as_secs();
        let response = self
            .client
            .get(with_token(url, &self.token))
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, shown, timeout_secs))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::HttpError {
                url: shown.to_owned(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: MatrixResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                convert_reqwest_error(err, shown, timeout_secs)
            } else {
                MatrixError::ParseError {
                    message: err.without_url().to_string(),
                }
            }
        })?;
        convert_response(body).map(Attempt::Done)
    }
}

enum Attempt {
    Done(BlockMatrix),
    RateLimited,
}

#[async_trait]
impl MatrixService for HttpMatrixService {
    async fn fetch_block(&self, request: &BlockRequest) -> Result<BlockMatrix, MatrixError> {
        let limit = self.config.max_coordinates_per_request;
        if request.coordinates.len() > limit {
            return Err(MatrixError::RequestTooLarge {
                coordinates: request.coordinates.len(),
                limit,
            });
        }

        let url = self.block_url(request);
        let shown = url.to_string();
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            match self.fetch_once(&url, &shown).await? {
                Attempt::Done(block) => return Ok(block),
                Attempt::RateLimited if attempts > self.config.rate_limit_retries => {
                    return Err(MatrixError::RateLimited {
                        url: shown,
                        attempts,
                    });
                }
                Attempt::RateLimited => {
                    log::debug!(
                        "rate limited by Mapbox (attempt {attempts}); retrying in {:?}",
                        self.config.retry_backoff
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
            }
        }
    }
}

fn join_indices(positions: std::ops::Range<usize>) -> String {
    positions
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Convert a Directions Matrix payload to a [`BlockMatrix`].
fn convert_response(response: MatrixResponse) -> Result<BlockMatrix, MatrixError> {
    if !response.is_ok() {
        return Err(MatrixError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let missing = |field: &str| MatrixError::ParseError {
        message: format!("Mapbox response missing {field} array"),
    };
    Ok(BlockMatrix {
        durations: response.durations.ok_or_else(|| missing("durations"))?,
        distances: response.distances.ok_or_else(|| missing("distances"))?,
    })
}
