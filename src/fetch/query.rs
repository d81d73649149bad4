//! Query proxy.
//!
//! A target that is a UUID names a stored query and is POSTed with its
//! filters; anything else is an endpoint name read for one customer.
//! Results are never cached.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{FetchError, Result};
use crate::fetch::{HttpRequest, PaidClient, RawResponse};

// == Query Filters ==
/// Optional filters; absent fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl QueryFilters {
    pub fn for_customer(customer_external_id: impl Into<String>) -> Self {
        Self {
            customer_external_id: Some(customer_external_id.into()),
            ..Self::default()
        }
    }
}

/// True for hyphenated UUIDs, the form stored query ids take.
pub(crate) fn is_query_id(target: &str) -> bool {
    target.len() == 36 && Uuid::parse_str(target).is_ok()
}

impl PaidClient {
    // == Run Query ==
    /// Runs a stored query or reads an endpoint through the query proxy.
    ///
    /// Fails with `FetchError::Api` on a non-success status.
    pub async fn run_query(&self, target: &str, filters: &QueryFilters) -> Result<RawResponse> {
        let options = self.options();
        let custom = options.custom_base();

        let request = if is_query_id(target) {
            let url = match custom {
                Some(base) => format!("{base}/blocks/query/{target}"),
                None => format!("{}/blocks/query/{target}", options.proxy_base()),
            };
            HttpRequest::post(url)
                .headers(&options.headers)
                .json(serde_json::to_value(filters)?)
        } else {
            let customer = filters
                .customer_external_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    FetchError::MissingParameters(format!(
                        "customer_external_id is required for endpoint: {target}"
                    ))
                })?;
            let url = match custom {
                Some(base) => format!("{base}/customers/{customer}/{target}"),
                None => format!("{}/{target}/{customer}", options.proxy_base()),
            };
            HttpRequest::get(url).headers(&options.headers)
        };

        debug!(method = %request.method, url = %request.url, "running query");
        let response = self.transport().send(request).await?;
        if !response.is_success() {
            warn!(query = target, status = response.status, "query failed");
            return Err(FetchError::Api {
                status: response.status,
                status_text: response.status_text,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DataCache;
    use crate::fetch::mock::MockTransport;
    use crate::fetch::ClientOptions;
    use reqwest::Method;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const QUERY_ID: &str = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";

    fn client_with(transport: Arc<MockTransport>, options: ClientOptions) -> PaidClient {
        PaidClient::new(DataCache::default(), transport, options)
    }

    #[test]
    fn test_query_id_detection() {
        assert!(is_query_id(QUERY_ID));
        assert!(is_query_id(&QUERY_ID.to_uppercase()));
        assert!(!is_query_id("invoices"));
        assert!(!is_query_id("3f2504e04f8941d39a0c0305e82c3301"));
        assert!(!is_query_id("{3f2504e0-4f89-41d3-9a0c-0305e82c3301}"));
    }

    #[test]
    fn test_filters_skip_absent_fields() {
        let filters = QueryFilters {
            agent_external_id: Some("agent_1".to_string()),
            start_date: Some("2024-01-01".to_string()),
            ..QueryFilters::default()
        };
        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!({"agentExternalId": "agent_1", "startDate": "2024-01-01"})
        );
        assert_eq!(serde_json::to_value(QueryFilters::default()).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_stored_query_posts_filters() {
        let transport = MockTransport::always(200, json!({"rows": []})).shared();
        let client = PaidClient::new(
            DataCache::default(),
            transport.clone(),
            ClientOptions::custom_backend("https://api.example.com"),
        );

        let response = client
            .run_query(QUERY_ID, &QueryFilters::for_customer("c1"))
            .await
            .unwrap();
        assert_eq!(response.json::<Value>().unwrap(), json!({"rows": []}));

        let requests = transport.requests();
        let sent = &requests[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, format!("https://api.example.com/blocks/query/{QUERY_ID}"));
        assert_eq!(sent.body, Some(json!({"customerExternalId": "c1"})));
    }

    #[tokio::test]
    async fn test_endpoint_query_gets_through_proxy_and_is_not_cached() {
        let transport = MockTransport::always(200, json!({"data": []})).shared();
        let client = client_with(transport.clone(), ClientOptions::default());
        let filters = QueryFilters::for_customer("c1");

        client.run_query("usage", &filters).await.unwrap();
        client.run_query("usage", &filters).await.unwrap();

        let requests = transport.requests();
        let sent = &requests[0];
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url, "http://localhost:3000/api/usage/c1");
        assert_eq!(sent.body, None);
        assert_eq!(transport.calls(), 2);
        assert_eq!(client.cache().stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_empty_base_url_queries_through_proxy() {
        let transport = MockTransport::always(200, json!({})).shared();
        let client = client_with(transport.clone(), ClientOptions::custom_backend(""));
        let filters = QueryFilters::for_customer("c1");

        client.run_query("usage", &filters).await.unwrap();
        client.run_query(QUERY_ID, &filters).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://localhost:3000/api/usage/c1");
        assert_eq!(
            requests[1].url,
            format!("http://localhost:3000/api/blocks/query/{QUERY_ID}")
        );
    }

    #[tokio::test]
    async fn test_endpoint_query_requires_customer() {
        let transport = MockTransport::always(200, json!({})).shared();
        let client = client_with(transport.clone(), ClientOptions::default());

        let err = client
            .run_query("invoices", &QueryFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingParameters(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_failure_maps_to_api_error() {
        let transport = MockTransport::new(|_, _| Ok(RawResponse::new(500, "boom"))).shared();
        let client = client_with(transport, ClientOptions::default());

        let err = client
            .run_query(QUERY_ID, &QueryFilters::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Paid API error: 500 Internal Server Error");
    }
}
