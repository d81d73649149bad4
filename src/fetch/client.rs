//! Paid API client with response-shaped results.
//!
//! `fetch_paid_data` resolves an endpoint descriptor to a URL and cache key,
//! answers from the cache when it can and otherwise goes to the backend.
//! Callers get a `PaidResponse` either way and do not need to know which
//! path produced it. Failed responses come back as `FetchError::Rejected`
//! carrying the raw response.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{keys, ttl, DataCache};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::fetch::{cached_fetch, HttpRequest, HttpTransport, ReqwestTransport};

// == Endpoint ==
/// Backend resources the client knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaidEndpoint {
    Invoices,
    Payments,
    Usage,
    InvoicePdf,
    PayInvoice,
    CreditBundles,
    AlertRules,
    PlanGroups,
}

impl PaidEndpoint {
    pub const ALL: [PaidEndpoint; 8] = [
        PaidEndpoint::Invoices,
        PaidEndpoint::Payments,
        PaidEndpoint::Usage,
        PaidEndpoint::InvoicePdf,
        PaidEndpoint::PayInvoice,
        PaidEndpoint::CreditBundles,
        PaidEndpoint::AlertRules,
        PaidEndpoint::PlanGroups,
    ];

    /// Path segment used by both URL layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaidEndpoint::Invoices => "invoices",
            PaidEndpoint::Payments => "payments",
            PaidEndpoint::Usage => "usage",
            PaidEndpoint::InvoicePdf => "invoice-pdf",
            PaidEndpoint::PayInvoice => "pay-invoice",
            PaidEndpoint::CreditBundles => "credit-bundles",
            PaidEndpoint::AlertRules => "alert-rules",
            PaidEndpoint::PlanGroups => "plan-groups",
        }
    }

    /// Endpoints addressed by customer id rather than invoice id.
    pub fn is_customer_scoped(&self) -> bool {
        !matches!(self, PaidEndpoint::InvoicePdf | PaidEndpoint::PayInvoice)
    }

    /// Cache key for `id`, or `None` for endpoints that are never cached.
    pub fn cache_key(&self, id: &str) -> Option<String> {
        match self {
            PaidEndpoint::Invoices => Some(keys::invoices(id)),
            PaidEndpoint::Payments => Some(keys::payments(id)),
            PaidEndpoint::Usage => Some(keys::usage(id)),
            PaidEndpoint::InvoicePdf => Some(keys::invoice_pdf(id)),
            PaidEndpoint::CreditBundles => Some(keys::credit_bundles(id)),
            PaidEndpoint::AlertRules => Some(keys::alert_rules(id)),
            PaidEndpoint::PlanGroups => Some(keys::plan_groups(id)),
            PaidEndpoint::PayInvoice => None,
        }
    }

    /// Lifetime of a cached response, `None` when not cached.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            PaidEndpoint::PayInvoice => None,
            PaidEndpoint::InvoicePdf => Some(ttl::PDF),
            _ => Some(ttl::DATA),
        }
    }
}

impl fmt::Display for PaidEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaidEndpoint {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == s)
            .ok_or_else(|| FetchError::InvalidRequest(format!("Unknown endpoint: {s}")))
    }
}

// == Request Descriptor ==
/// What a caller wants from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidRequest {
    pub endpoint: PaidEndpoint,
    pub customer_external_id: Option<String>,
    pub invoice_id: Option<String>,
    pub body: Option<Value>,
}

impl PaidRequest {
    pub fn new(endpoint: PaidEndpoint) -> Self {
        Self {
            endpoint,
            customer_external_id: None,
            invoice_id: None,
            body: None,
        }
    }

    /// A customer-scoped read such as invoices or usage.
    pub fn customer(endpoint: PaidEndpoint, customer_external_id: impl Into<String>) -> Self {
        Self {
            customer_external_id: Some(customer_external_id.into()),
            ..Self::new(endpoint)
        }
    }

    pub fn invoice_pdf(invoice_id: impl Into<String>) -> Self {
        Self {
            invoice_id: Some(invoice_id.into()),
            ..Self::new(PaidEndpoint::InvoicePdf)
        }
    }

    pub fn pay_invoice(invoice_id: impl Into<String>, body: Value) -> Self {
        Self {
            invoice_id: Some(invoice_id.into()),
            body: Some(body),
            ..Self::new(PaidEndpoint::PayInvoice)
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The id the endpoint is addressed by.
    pub fn entity_id(&self) -> Option<&str> {
        if self.endpoint.is_customer_scoped() {
            self.customer_external_id.as_deref()
        } else {
            self.invoice_id.as_deref()
        }
    }

    /// Cache key of this request, `None` when it is never cached or lacks an id.
    pub fn cache_key(&self) -> Option<String> {
        self.entity_id().and_then(|id| self.endpoint.cache_key(id))
    }
}

// == Client Options ==
/// Where requests go and what they carry.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Custom backend base URL; proxy layout under `proxy_origin` when `None`
    pub base_url: Option<String>,
    /// Origin serving the `/api/...` proxy routes
    pub proxy_origin: String,
    /// Headers added to every request
    pub headers: Vec<(String, String)>,
}

impl ClientOptions {
    pub fn proxy(origin: impl Into<String>) -> Self {
        Self {
            base_url: None,
            proxy_origin: origin.into(),
            headers: Vec::new(),
        }
    }

    pub fn custom_backend(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let mut options = Self {
            base_url: config.base_url.clone(),
            proxy_origin: config.proxy_origin.clone(),
            headers: Vec::new(),
        };
        if let Some(key) = &config.api_key {
            options = options.with_header("Authorization", format!("Bearer {key}"));
        }
        options
    }

    /// Custom backend base without a trailing slash. An empty base URL
    /// selects the proxy layout.
    pub fn custom_base(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Prefix of the proxy routes, `{origin}/api`.
    pub fn proxy_base(&self) -> String {
        format!("{}/api", self.proxy_origin.trim_end_matches('/'))
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::proxy("http://localhost:3000")
    }
}

// == Paid Response ==
/// A successful result, from the cache or the network.
///
/// Cache hits report status 200 so callers can treat both paths alike.
#[derive(Debug, Clone, PartialEq)]
pub enum PaidResponse {
    Cached(Value),
    Network {
        status: u16,
        status_text: String,
        data: Value,
    },
}

impl PaidResponse {
    /// Always true: failures are returned as errors.
    pub fn ok(&self) -> bool {
        true
    }

    pub fn status(&self) -> u16 {
        match self {
            PaidResponse::Cached(_) => 200,
            PaidResponse::Network { status, .. } => *status,
        }
    }

    pub fn status_text(&self) -> &str {
        match self {
            PaidResponse::Cached(_) => "OK",
            PaidResponse::Network { status_text, .. } => status_text,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, PaidResponse::Cached(_))
    }

    pub fn data(&self) -> &Value {
        match self {
            PaidResponse::Cached(data) | PaidResponse::Network { data, .. } => data,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            PaidResponse::Cached(data) | PaidResponse::Network { data, .. } => data,
        }
    }

    /// Decodes the payload into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(self.data())?)
    }
}

/// Resolved target of a request.
#[derive(Debug, Clone, PartialEq)]
struct Route {
    method: Method,
    url: String,
    cache: Option<(String, Duration)>,
}

// == Paid Client ==
/// Cache-aware client for the billing backend. Cheap to clone.
#[derive(Clone)]
pub struct PaidClient {
    cache: DataCache,
    transport: Arc<dyn HttpTransport>,
    options: ClientOptions,
}

impl fmt::Debug for PaidClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaidClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PaidClient {
    pub fn new(
        cache: DataCache,
        transport: Arc<dyn HttpTransport>,
        options: ClientOptions,
    ) -> Self {
        Self {
            cache,
            transport,
            options,
        }
    }

    /// Builds a client backed by reqwest from configuration.
    pub fn from_config(cache: DataCache, config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout))?;
        Ok(Self::new(
            cache,
            Arc::new(transport),
            ClientOptions::from_config(config),
        ))
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// `cached_fetch` over this client's cache and transport.
    pub async fn cached_fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        cache_key: &str,
        ttl: Duration,
    ) -> Result<T> {
        cached_fetch(&self.cache, self.transport(), url, cache_key, ttl).await
    }

    // == Fetch Paid Data ==
    /// Serves `request` from the cache or the backend.
    ///
    /// Only GET responses are cached; `pay-invoice` is always POSTed and
    /// never cached. A non-success status is returned as
    /// `FetchError::Rejected` with the raw response.
    pub async fn fetch_paid_data(&self, request: &PaidRequest) -> Result<PaidResponse> {
        let route = self.route(request)?;

        if let Some((key, _)) = &route.cache {
            if let Some(data) = self.cache.get(key).await {
                debug!(key = %key, "serving {} from cache", request.endpoint);
                return Ok(PaidResponse::Cached(data));
            }
        }

        let mut http = HttpRequest::new(route.method.clone(), route.url.clone())
            .headers(&self.options.headers);
        if let Some(body) = &request.body {
            http = http.json(body.clone());
        }

        let response = self.transport.send(http).await?;
        if !response.is_success() {
            warn!(
                endpoint = %request.endpoint,
                status = response.status,
                "backend rejected request"
            );
            return Err(FetchError::Rejected(response));
        }

        let data: Value = response.json()?;
        if route.method == Method::GET {
            if let Some((key, ttl)) = route.cache {
                self.cache.set(key, data.clone(), Some(ttl)).await;
            }
        }

        Ok(PaidResponse::Network {
            status: response.status,
            status_text: response.status_text,
            data,
        })
    }

    fn route(&self, request: &PaidRequest) -> Result<Route> {
        let endpoint = request.endpoint;
        let custom = self.options.custom_base();

        match endpoint {
            PaidEndpoint::PayInvoice => {
                require(request.invoice_id.as_deref(), "invoice_id")?;
                let url = match custom {
                    Some(base) => format!("{base}/payments/pay-invoice"),
                    None => format!("{}/pay-invoice", self.options.proxy_base()),
                };
                Ok(Route {
                    method: Method::POST,
                    url,
                    cache: None,
                })
            }
            PaidEndpoint::InvoicePdf => {
                let invoice_id = require(request.invoice_id.as_deref(), "invoice_id")?;
                let url = match custom {
                    Some(base) => format!("{base}/invoices/{invoice_id}/pdf"),
                    None => format!("{}/{endpoint}/{invoice_id}", self.options.proxy_base()),
                };
                Ok(Route {
                    method: Method::GET,
                    url,
                    cache: cache_slot(endpoint, invoice_id),
                })
            }
            _ => {
                let customer = require(
                    request.customer_external_id.as_deref(),
                    "customer_external_id",
                )?;
                let url = match custom {
                    Some(base) => format!("{base}/customers/{customer}/{endpoint}"),
                    None => format!("{}/{endpoint}/{customer}", self.options.proxy_base()),
                };
                Ok(Route {
                    method: Method::GET,
                    url,
                    cache: cache_slot(endpoint, customer),
                })
            }
        }
    }
}

fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FetchError::MissingParameters(name.to_string()))
}

fn cache_slot(endpoint: PaidEndpoint, id: &str) -> Option<(String, Duration)> {
    endpoint.cache_key(id).zip(endpoint.ttl())
}
