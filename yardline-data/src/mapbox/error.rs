//! Construction errors for the Mapbox clients.

use super::config::ACCESS_TOKEN_VAR;

/// Error type for Mapbox client construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// No access token was configured.
    MissingCredentials {
        /// Environment variable expected to hold the token.
        variable: &'static str,
    },
    /// The base URL could not be parsed or cannot carry a path.
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser error, if parsing itself failed.
        source: Option<url::ParseError>,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl ProviderBuildError {
    pub(crate) const fn missing_token() -> Self {
        Self::MissingCredentials {
            variable: ACCESS_TOKEN_VAR,
        }
    }
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials { variable } => {
                write!(f, "missing Mapbox access token (set {variable})")
            }
            Self::InvalidBaseUrl { url, .. } => write!(f, "invalid Mapbox base URL {url:?}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingCredentials { .. } => None,
            Self::InvalidBaseUrl { source, .. } => source
                .as_ref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}
