use thiserror::Error;

/// Errors from [`crate::routing::RoutingBackend::lookup`].
///
/// Every variant is non-fatal to the decision pipeline: the affected postcode
/// is treated as unresolved and its orders are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The request could not reach the routing service.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Endpoint without credentials.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The routing service did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint without credentials.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Endpoint without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The routing service rejected the request.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `OVER_QUERY_LIMIT`.
        code: String,
        /// Optional explanation from the service.
        message: String,
    },
    /// No route exists between the depot and the destination.
    #[error("no route to {destination} ({status})")]
    NoRoute {
        /// Destination postcode.
        destination: String,
        /// Element status reported by the service.
        status: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
}
