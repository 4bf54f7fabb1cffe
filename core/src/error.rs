//! Error types for the API client.
//!
//! # Design
//! The first three variants are the domain errors a caller is expected to
//! match on: a bad endpoint, a method outside the allow-list, and a rejected
//! query parameter. Transport failures are mapped literally: a URL the
//! transport cannot use is an `InvalidEndpoint`, an unreachable host is a
//! `Connection` error. HTTP status codes are never errors.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint does not start with `/`, or the assembled URL was
    /// rejected by the transport.
    #[error("Invalid endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },

    /// The method is not one of `GET`, `POST`, `PUT`, `PATCH`, `DELETE`.
    #[error("Invalid method: {method}")]
    InvalidHttpMethod { method: String },

    /// A query parameter failed validation.
    #[error("{message}: {parameter}")]
    InvalidRequestParameter { message: String, parameter: String },

    /// The host could not be reached or the request timed out.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The JSON body could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    /// Map a transport failure for `url` onto the client's error taxonomy.
    pub(crate) fn from_transport(url: &str, err: TransportError) -> Self {
        match err {
            TransportError::InvalidUrl(_) => ApiError::InvalidEndpoint {
                endpoint: url.to_string(),
            },
            TransportError::Connection(msg) => ApiError::Connection(msg),
            TransportError::Timeout => ApiError::Connection("request timed out".to_string()),
            other @ TransportError::Other(_) => ApiError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_domain_messages() {
        let err = ApiError::InvalidEndpoint {
            endpoint: "posts".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid endpoint: posts");

        let err = ApiError::InvalidHttpMethod {
            method: "FETCH".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid method: FETCH");

        let err = ApiError::InvalidRequestParameter {
            message: "Invalid request parameter".to_string(),
            parameter: "invalid_param".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid request parameter: invalid_param");
    }

    #[test]
    fn invalid_url_maps_to_invalid_endpoint() {
        let err = ApiError::from_transport(
            "bad url/posts",
            TransportError::InvalidUrl("invalid uri character".to_string()),
        );
        assert!(matches!(err, ApiError::InvalidEndpoint { ref endpoint } if endpoint == "bad url/posts"));
    }

    #[test]
    fn unreachable_host_maps_to_connection() {
        let err = ApiError::from_transport(
            "http://nowhere.invalid/posts",
            TransportError::Connection("host not found".to_string()),
        );
        assert!(matches!(err, ApiError::Connection(ref msg) if msg == "host not found"));

        let err = ApiError::from_transport("http://slow.test/posts", TransportError::Timeout);
        assert!(matches!(err, ApiError::Connection(_)));
    }

    #[test]
    fn other_failures_keep_their_source() {
        let inner = std::io::Error::other("boom");
        let err = ApiError::from_transport("http://x.test/", TransportError::Other(Box::new(inner)));
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
