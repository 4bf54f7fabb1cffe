//! Thin, validating HTTP client for JSON REST APIs.
//!
//! # Overview
//! `ApiClient` joins a fixed base URL with a caller-supplied endpoint,
//! checks the endpoint, method and query parameters, and hands the request
//! to a [`Transport`]. The response comes back exactly as the server sent it.
//!
//! # Design
//! - `ApiClient` is immutable after construction. It holds the base URL, an
//!   optional query-parameter allow-list, a shared transport and a logging
//!   span, so clones can be used from any thread.
//! - Validation failures never reach the transport and are reported as
//!   `ApiError::{InvalidEndpoint, InvalidHttpMethod, InvalidRequestParameter}`.
//! - The transport is a trait. `UreqTransport` is the default; tests swap
//!   in recording fakes.
//! - Logging goes through `tracing`; the host decides where it ends up.
//!
//! ```no_run
//! use api_client::ApiClient;
//!
//! let client = ApiClient::new("https://jsonplaceholder.typicode.com");
//! let response = client.get("/posts/1", None, None)?;
//! assert_eq!(response.status, 200);
//! # Ok::<(), api_client::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder, Pairs};
pub use error::ApiError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError, UreqTransport};
