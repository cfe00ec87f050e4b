use thiserror::Error;

/// Errors from [`crate::matrix::TravelMatrixProvider::travel_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// No points were provided.
    ///
    /// A matrix needs at least the depot. Callers should pre-filter input to
    /// avoid this condition.
    #[error("at least one point (the depot) is required")]
    EmptyInput,

    /// A point had a non-finite or out-of-range coordinate.
    #[error("point {index} has an invalid coordinate")]
    InvalidCoordinate {
        /// Node index of the offending point.
        index: usize,
    },

    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL without credentials.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Request URL without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text reported by the client.
        message: String,
    },

    /// The service kept rejecting requests with HTTP 429.
    #[error("request to {url} was rate limited after {attempts} attempts")]
    RateLimited {
        /// Request URL without credentials.
        url: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// A transport-level failure such as a refused connection.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL without credentials.
        url: String,
        /// Error text reported by the client.
        message: String,
    },

    /// The service answered with an error code in its payload.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `"InvalidInput"`.
        code: String,
        /// Service error message.
        message: String,
    },

    /// The response body could not be decoded or had the wrong shape.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder or validation message.
        message: String,
    },

    /// A single request would carry more coordinates than the service allows.
    #[error("request of {coordinates} coordinates exceeds the limit of {limit}")]
    RequestTooLarge {
        /// Coordinates in the attempted request.
        coordinates: usize,
        /// Per-request coordinate limit.
        limit: usize,
    },

    /// A provider returned rows of the wrong length.
    #[error("travel matrix must be square: expected {expected} columns, row {row} has {actual}")]
    NotSquare {
        /// Expected row length.
        expected: usize,
        /// Offending row.
        row: usize,
        /// Actual row length.
        actual: usize,
    },
}
