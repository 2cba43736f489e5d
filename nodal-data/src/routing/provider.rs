//! HTTP `RoutingBackend` using the Google Distance Matrix API.
//!
//! The [`RoutingBackend`] trait is synchronous so the decision engine stays
//! embeddable in synchronous contexts. This backend bridges to the async
//! HTTP client by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use nodal_core::RoutingBackend;
//! use nodal_data::routing::HttpRoutingBackend;
//!
//! let backend = HttpRoutingBackend::new("my-api-key")?;
//! let route = backend.lookup("NN15 6NL", "NW1 6XE")?;
//! println!("{} metres", route.distance_metres);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::time::Duration;

use nodal_core::{BackendRoute, RoutingBackend, RoutingError};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::distance_matrix::MatrixResponse;

/// Errors raised while building an [`HttpRoutingBackend`].
#[derive(Debug, Error)]
pub enum BackendBuildError {
    /// No API key was supplied.
    #[error("a routing API key is required")]
    MissingApiKey,
    /// The base URL could not be parsed.
    #[error("invalid routing base URL {url}")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Default base URL of the Distance Matrix service.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "nodal-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const MATRIX_PATH: &str = "maps/api/distancematrix/json";

/// Configuration for [`HttpRoutingBackend`].
///
/// `Debug` output never shows the API key.
#[derive(Clone)]
pub struct HttpRoutingBackendConfig {
    /// Base URL of the service (e.g., `"https://maps.googleapis.com"`).
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for HttpRoutingBackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRoutingBackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpRoutingBackendConfig {
    /// Create a configuration for the public service with `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Point the backend at another host, e.g. a test double.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
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
}

/// Distance Matrix backend asking for pessimistic, traffic-aware driving
/// times departing now.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the backend blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// with [`tokio::task::block_in_place`]. Inside a `current_thread` runtime
/// it falls back to its own runtime, which may deadlock if the caller's
/// runtime drives IO this request depends on.
pub struct HttpRoutingBackend {
    client: Client,
    config: HttpRoutingBackendConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl fmt::Debug for HttpRoutingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRoutingBackend")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpRoutingBackend {
    /// Create a backend for the public service.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendBuildError> {
        Self::with_config(HttpRoutingBackendConfig::new(api_key))
    }

    /// Create a backend with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank, the base URL is invalid, or the
    /// HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRoutingBackendConfig) -> Result<Self, BackendBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(BackendBuildError::MissingApiKey);
        }
        let endpoint = matrix_endpoint(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(BackendBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BackendBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// Query parameters for one lookup, including the key.
    fn query<'a>(&'a self, origin: &'a str, destination: &'a str) -> [(&'static str, &'a str); 6] {
        [
            ("origins", origin),
            ("destinations", destination),
            ("mode", "driving"),
            ("departure_time", "now"),
            ("traffic_model", "pessimistic"),
            ("key", self.config.api_key.as_str()),
        ]
    }

    async fn lookup_async(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<BackendRoute, RoutingError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&self.query(origin, destination))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err))?;

        let matrix: MatrixResponse =
            response
                .json()
                .await
                .map_err(|err| RoutingError::ParseError {
                    message: err.without_url().to_string(),
                })?;

        convert_response(matrix, destination)
    }

    /// Convert a reqwest error to a `RoutingError`.
    ///
    /// The request URL carries the API key, so only the bare endpoint is
    /// reported.
    fn convert_reqwest_error(&self, error: reqwest::Error) -> RoutingError {
        let url = self.endpoint.to_string();
        if error.is_timeout() {
            return RoutingError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        let status = error.status();
        let message = error.without_url().to_string();
        if let Some(status) = status {
            return RoutingError::HttpError {
                url,
                status: status.as_u16(),
                message,
            };
        }

        RoutingError::NetworkError { url, message }
    }
}

fn matrix_endpoint(base_url: &str) -> Result<Url, BackendBuildError> {
    let invalid = |source| BackendBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source,
    };
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(invalid)?;
    base.join(MATRIX_PATH).map_err(invalid)
}

/// Convert a Distance Matrix response to raw route figures.
fn convert_response(
    response: MatrixResponse,
    destination: &str,
) -> Result<BackendRoute, RoutingError> {
    if !response.is_ok() {
        return Err(RoutingError::ServiceError {
            code: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    let element = response
        .first_element()
        .ok_or_else(|| RoutingError::ParseError {
            message: "response has no rows[0].elements[0]".to_owned(),
        })?;
    if !element.is_ok() {
        return Err(RoutingError::NoRoute {
            destination: destination.to_owned(),
            status: element.status.clone(),
        });
    }

    let missing = |field: &str| RoutingError::ParseError {
        message: format!("element is missing {field}"),
    };
    let distance = element.distance.as_ref().ok_or_else(|| missing("distance"))?;
    let duration = element.duration.as_ref().ok_or_else(|| missing("duration"))?;

    Ok(BackendRoute {
        distance_metres: distance.value,
        duration_seconds: duration.value,
        duration_in_traffic_seconds: element.duration_in_traffic.as_ref().map(|m| m.value),
    })
}

impl RoutingBackend for HttpRoutingBackend {
    /// Look up the driving route from `origin` to `destination`.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded (`flavor = "multi_thread"`).
    fn lookup(&self, origin: &str, destination: &str) -> Result<BackendRoute, RoutingError> {
        let future = self.lookup_async(origin, destination);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
