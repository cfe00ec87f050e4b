//! Settings for the Mapbox clients.

use std::env;
use std::time::Duration;

/// Environment variable holding the Mapbox access token.
pub const ACCESS_TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";
/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_VAR: &str = "MAPBOX_BASE_URL";
/// Environment variable overriding [`DEFAULT_PROFILE`].
pub const PROFILE_VAR: &str = "MAPBOX_MATRIX_PROFILE";

/// Public Mapbox API host.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";
/// Routing profile used for matrix requests.
pub const DEFAULT_PROFILE: &str = "driving";
/// Coordinate limit of a single Directions Matrix request.
pub const DEFAULT_MAX_COORDINATES_PER_REQUEST: usize = 25;
/// Block requests allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
/// Default user agent for Mapbox requests.
pub const DEFAULT_USER_AGENT: &str = "yardline-routing/0.1";
/// Retries granted to a request answered with HTTP 429.
pub const DEFAULT_RATE_LIMIT_RETRIES: u32 = 2;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF_SECS: u64 = 1;

/// Configuration shared by [`crate::mapbox::MapboxMatrixProvider`] and
/// [`crate::mapbox::MapboxGeocoder`].
///
/// The access token is optional here so a configuration can be assembled
/// piecemeal; clients that talk to Mapbox refuse to build without one.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use yardline_data::mapbox::MapboxConfig;
///
/// let config = MapboxConfig::new("pk.test")
///     .with_profile("driving-traffic")
///     .with_max_coordinates_per_request(10)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.block_size(), 5);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct MapboxConfig {
    /// Mapbox access token.
    pub access_token: Option<String>,
    /// API host, e.g. `"https://api.mapbox.com"`.
    pub base_url: String,
    /// Directions Matrix profile, e.g. `"driving"`.
    pub profile: String,
    /// Maximum coordinates sent in one matrix request.
    pub max_coordinates_per_request: usize,
    /// Maximum block requests in flight.
    pub max_concurrent_requests: usize,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Retries after an HTTP 429 before the block is abandoned.
    pub rate_limit_retries: u32,
    /// Pause before each rate-limit retry.
    pub retry_backoff: Duration,
}

impl std::fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field(
                "max_coordinates_per_request",
                &self.max_coordinates_per_request,
            )
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("rate_limit_retries", &self.rate_limit_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            max_coordinates_per_request: DEFAULT_MAX_COORDINATES_PER_REQUEST,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            rate_limit_retries: DEFAULT_RATE_LIMIT_RETRIES,
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
        }
    }
}

impl MapboxConfig {
    /// Create a configuration with the given access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    /// Read the token, base URL and profile from the process environment.
    ///
    /// Unset or blank variables keep their defaults; a blank token counts as
    /// missing.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`MapboxConfig::from_env`] with a caller-supplied lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self {
            access_token: read(ACCESS_TOKEN_VAR),
            ..Self::default()
        };
        if let Some(base_url) = read(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(profile) = read(PROFILE_VAR) {
            config.profile = profile;
        }
        config
    }

    /// Set the access token.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Set the API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the per-request coordinate limit.
    #[must_use]
    pub fn with_max_coordinates_per_request(mut self, limit: usize) -> Self {
        self.max_coordinates_per_request = limit;
        self
    }

    /// Set the number of block requests allowed in flight.
    #[must_use]
    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the rate-limit retry policy.
    #[must_use]
    pub fn with_rate_limit_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.rate_limit_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    /// Nodes per block: half the coordinate limit, at least one.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        let half = self.max_coordinates_per_request / 2;
        if half == 0 { 1 } else { half }
    }

    /// Concurrency limit, at least one.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        if self.max_concurrent_requests == 0 {
            1
        } else {
            self.max_concurrent_requests
        }
    }

    /// The token, if present and non-blank.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
