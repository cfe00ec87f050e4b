//! Plumbing shared by the Mapbox HTTP clients.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;
use yardline_core::MatrixError;

use super::config::MapboxConfig;
use super::error::ProviderBuildError;

/// Build a client honouring the configured timeout and user agent.
pub(crate) fn build_client(config: &MapboxConfig) -> Result<Client, ProviderBuildError> {
    Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(config.timeout)
        .timeout(config.timeout)
        .build()
        .map_err(ProviderBuildError::HttpClient)
}

/// A current-thread runtime for blocking callers.
pub(crate) fn build_runtime() -> Result<Runtime, ProviderBuildError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ProviderBuildError::Runtime)
}

/// Drive `future` to completion from synchronous code.
///
/// Reuses the caller's runtime when it is multi-threaded. Outside any
/// runtime it blocks on `fallback`. Inside a `current_thread` runtime,
/// where neither is allowed, `fallback` drives the future on a scoped
/// helper thread while the caller waits.
pub(crate) fn block_on<F>(fallback: &Runtime, future: F) -> F::Output
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| fallback.block_on(future))
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        }),
        Err(_) => fallback.block_on(future),
    }
}

/// Parse the configured host, rejecting URLs that cannot carry a path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|err| ProviderBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        source: Some(err),
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::InvalidBaseUrl {
            url: raw.to_owned(),
            source: None,
        });
    }
    Ok(url)
}

/// `base` with `segments` appended to its path.
pub(crate) fn join_path<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Url {
    let mut url = base.clone();
    // Checked by `parse_base_url`; a base that cannot carry a path is never stored.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// `url` with the access token appended to its query.
pub(crate) fn with_token(url: &Url, token: &str) -> Url {
    let mut authorised = url.clone();
    authorised.query_pairs_mut().append_pair("access_token", token);
    authorised
}

/// Convert a reqwest error to a `MatrixError`.
///
/// `url` is the request URL without credentials; the client's own copy,
/// which carries the token, is stripped from the message.
pub(crate) fn convert_reqwest_error(
    error: reqwest::Error,
    url: &str,
    timeout_secs: u64,
) -> MatrixError {
    if error.is_timeout() {
        return MatrixError::Timeout {
            url: url.to_owned(),
            timeout_secs,
        };
    }

    let status = error.status();
    let message = error.without_url().to_string();
    match status {
        Some(status) => MatrixError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message,
        },
        None => MatrixError::NetworkError {
            url: url.to_owned(),
            message,
        },
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The `message` of a Mapbox error body, or the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api.mapbox.com")]
    #[case("https://api.mapbox.com/")]
    fn join_path_ignores_trailing_slash(#[case] base: &str) {
        let base = parse_base_url(base).expect("valid");
        let url = join_path(&base, ["geocoding", "v5"]);
        assert_eq!(url.as_str(), "https://api.mapbox.com/geocoding/v5");
    }

    #[rstest]
    fn join_path_keeps_coordinate_separators() {
        let base = parse_base_url("http://localhost:8080/proxy").expect("valid");
        let url = join_path(&base, ["mapbox", "-97.1,30.2;-97.3,30.4"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/mapbox/-97.1,30.2;-97.3,30.4"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:ops@example.com")]
    fn rejects_unusable_base_urls(#[case] raw: &str) {
        let err = parse_base_url(raw).expect_err("unusable");
        assert!(matches!(err, ProviderBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    fn token_is_only_on_the_authorised_copy() {
        let base = parse_base_url("https://api.mapbox.com").expect("valid");
        let authorised = with_token(&base, "pk.secret");
        assert!(authorised.as_str().contains("access_token=pk.secret"));
        assert!(!base.as_str().contains("pk.secret"));
    }

    #[rstest]
    #[case(r#"{"message": "Not Authorized - Invalid Token"}"#, "Not Authorized - Invalid Token")]
    #[case("Bad Gateway\n", "Bad Gateway")]
    fn error_message_prefers_json(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }
}
