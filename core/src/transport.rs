//! The transport boundary: anything that can turn an `HttpRequest` into an
//! `HttpResponse`.
//!
//! `UreqTransport` is the production implementation. It disables ureq's
//! status-code-as-error behavior so 4xx/5xx responses come back as data and
//! only genuine transport failures surface as `TransportError`.

use std::fmt::Debug;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// A failure below the HTTP layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The URL could not be parsed or is not usable by the transport.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// The host could not be resolved or the connection broke.
    #[error("connection error: {0}")]
    Connection(String),
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,
    /// Some other error occurred.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A blocking HTTP transport.
pub trait Transport: Debug + Send + Sync {
    /// Execute `request` and return the response, whatever its status.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A [`Transport`] backed by a [`ureq::Agent`].
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It should have `http_status_as_error`
    /// disabled, otherwise error statuses turn into `TransportError::Other`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let uri: http::Uri = request
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| TransportError::InvalidUrl(e.to_string()))?;

        let mut builder = http::Request::builder()
            .method(http::Method::from(request.method))
            .uri(uri);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let result = if let Some(body) = request.body {
            let req = builder
                .body(body.into_bytes())
                .map_err(|e| TransportError::Other(Box::new(e)))?;
            self.agent.run(req)
        } else {
            let req = builder
                .body(())
                .map_err(|e| TransportError::Other(Box::new(e)))?;
            self.agent.run(req)
        };

        convert_response(result.map_err(map_ureq_error)?)
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::BadUri(msg) => TransportError::InvalidUrl(msg),
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound => TransportError::Connection("host not found".to_owned()),
        ureq::Error::ConnectionFailed => {
            TransportError::Connection("connection failed".to_owned())
        }
        ureq::Error::Io(e) => TransportError::Connection(e.to_string()),
        e => TransportError::Other(Box::new(e)),
    }
}

/// Convert a ureq response into an [`HttpResponse`], keeping the body bytes
/// as received.
///
/// The body is read with ureq's default size cap (10 MiB); a larger body
/// surfaces as `TransportError::Other` wrapping `BodyExceedsLimit`.
fn convert_response(
    response: http::Response<ureq::Body>,
) -> Result<HttpResponse, TransportError> {
    let (parts, mut body) = response.into_parts();

    // Non-UTF-8 header values are not representable as `String` and are
    // dropped.
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect();
    let body = body.read_to_vec().map_err(map_ureq_error)?;

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        headers,
        body,
    })
}
