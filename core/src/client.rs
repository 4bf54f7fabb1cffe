//! Validating request dispatcher.
//!
//! # Design
//! `ApiClient` holds an immutable base URL, an optional query-parameter
//! allow-list, a shared `Transport` and the `tracing::Span` its log records
//! are emitted in. Nothing is mutated after construction, so a client can be
//! cloned and shared across threads freely.
//!
//! Every request goes through the same pipeline: endpoint check, method
//! check, query-parameter check, then a single transport call. All
//! validation happens before the transport is touched. The URL is always
//! `base_url + endpoint`, verbatim; only the query string is encoded.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, info_span, warn, Span};
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Header/query pairs as borrowed name-value tuples.
pub type Pairs<'a> = &'a [(&'a str, &'a str)];

/// Synchronous client that validates and forwards requests to a transport.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    allowed_params: Option<BTreeSet<String>>,
    transport: Arc<dyn Transport>,
    span: Span,
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    allowed_params: Option<BTreeSet<String>>,
    transport: Option<Arc<dyn Transport>>,
    span: Option<Span>,
}

impl ApiClientBuilder {
    /// Reject any query parameter whose name is not in `names`.
    pub fn allowed_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_params = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Send requests through `transport` instead of the default ureq agent.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Emit log records inside `span`.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> ApiClient {
        let span = self
            .span
            .unwrap_or_else(|| info_span!("api_client", base_url = %self.base_url));
        ApiClient {
            base_url: self.base_url,
            allowed_params: self.allowed_params,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(UreqTransport::new())),
            span,
        }
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.to_string(),
            allowed_params: None,
            transport: None,
            span: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for `endpoint`: `base_url + endpoint`, unnormalized.
    ///
    /// Fails with [`ApiError::InvalidEndpoint`] unless `endpoint` starts
    /// with `/`.
    pub fn url(&self, endpoint: &str) -> Result<String, ApiError> {
        let _enter = self.span.enter();
        self.construct_url(endpoint)
    }

    /// Validate and send one request, returning the raw response.
    ///
    /// Checks run in order (endpoint, method, query parameters) and the
    /// first failure is returned without contacting the transport. Any HTTP
    /// status, including 4xx and 5xx, is a successful return.
    pub fn request(
        &self,
        method: &str,
        endpoint: &str,
        headers: Option<Pairs<'_>>,
        params: Option<Pairs<'_>>,
        json: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let _enter = self.span.enter();

        let url = self.construct_url(endpoint)?;
        let method = validate_method(method)?;
        let params = params.unwrap_or_default();
        self.validate_params(endpoint, params)?;

        let request = build_request(
            method,
            append_query(url, params),
            headers.unwrap_or_default(),
            json,
        )?;
        let url = request.url.clone();

        info!("sending {method} request to {url}");
        let response = self
            .transport
            .send(request)
            .map_err(|err| ApiError::from_transport(&url, err))?;
        info!("received {} response from {url}", response.status);
        Ok(response)
    }

    pub fn get(
        &self,
        endpoint: &str,
        headers: Option<Pairs<'_>>,
        params: Option<Pairs<'_>>,
    ) -> Result<HttpResponse, ApiError> {
        self.request("GET", endpoint, headers, params, None)
    }

    pub fn post(
        &self,
        endpoint: &str,
        headers: Option<Pairs<'_>>,
        json: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        self.request("POST", endpoint, headers, None, json)
    }

    pub fn put(
        &self,
        endpoint: &str,
        headers: Option<Pairs<'_>>,
        json: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        self.request("PUT", endpoint, headers, None, json)
    }

    pub fn patch(
        &self,
        endpoint: &str,
        headers: Option<Pairs<'_>>,
        json: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        self.request("PATCH", endpoint, headers, None, json)
    }

    pub fn delete(&self, endpoint: &str, headers: Option<Pairs<'_>>) -> Result<HttpResponse, ApiError> {
        self.request("DELETE", endpoint, headers, None, None)
    }

    fn construct_url(&self, endpoint: &str) -> Result<String, ApiError> {
        if !endpoint.starts_with('/') {
            warn!(endpoint, "endpoint does not start with a /");
            return Err(ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(format!("{}{endpoint}", self.base_url))
    }

    /// Check the names of both the explicit `params` and any query string
    /// already embedded in `endpoint`.
    fn validate_params(&self, endpoint: &str, params: Pairs<'_>) -> Result<(), ApiError> {
        let embedded = endpoint.split_once('?').map_or("", |(_, query)| query);
        let names = form_urlencoded::parse(embedded.as_bytes())
            .map(|(name, _)| name.into_owned())
            .chain(params.iter().map(|(name, _)| (*name).to_string()));

        for name in names {
            if name.is_empty() {
                warn!("request parameter with an empty name");
                return Err(ApiError::InvalidRequestParameter {
                    message: "Empty request parameter name".to_string(),
                    parameter: name,
                });
            }
            if let Some(allowed) = &self.allowed_params {
                if !allowed.contains(&name) {
                    warn!(parameter = %name, "request parameter is not allowed");
                    return Err(ApiError::InvalidRequestParameter {
                        message: "Invalid request parameter".to_string(),
                        parameter: name,
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_method(method: &str) -> Result<HttpMethod, ApiError> {
    method.parse().inspect_err(|_| {
        warn!("{method} is not a valid HTTP method");
    })
}

fn append_query(mut url: String, params: Pairs<'_>) -> String {
    if params.is_empty() {
        return url;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&query);
    url
}

fn build_request(
    method: HttpMethod,
    url: String,
    headers: Pairs<'_>,
    json: Option<&Value>,
) -> Result<HttpRequest, ApiError> {
    let mut headers: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    let body = match json {
        Some(value) => {
            let body = serde_json::to_string(value).map_err(ApiError::Serialization)?;
            if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
            Some(body)
        }
        None => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}
