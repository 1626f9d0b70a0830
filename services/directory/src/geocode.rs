//! Geocoding proxy client
//!
//! Free-text address lookups are forwarded to a Nominatim-compatible search
//! endpoint. Results are biased toward a fixed viewbox (`bounded=0`: the box
//! ranks results, it never filters them) and returned unmodified.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Number of suggestions requested from the upstream service
pub const RESULT_LIMIT: u8 = 5;

/// Errors raised while calling the upstream geocoder
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Network failure
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Geocoding service returned status {0}")]
    Status(u16),

    /// Upstream body was not JSON
    #[error("Geocoding response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Geocoder configuration
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Search endpoint
    pub url: String,
    /// Static client identifier sent as `User-Agent`
    pub user_agent: String,
    /// Preferred result language
    pub language: String,
    /// `left,top,right,bottom` bias box
    pub viewbox: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "employee-directory/0.1".to_string(),
            language: "en".to_string(),
            viewbox: "123.80,10.45,124.05,10.20".to_string(),
        }
    }
}

/// Resolves free text to candidate places
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Upstream result list, passed through as-is
    async fn search(&self, query: &str) -> Result<Value, GeocodeError>;
}

/// Nominatim HTTP client
#[derive(Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Query string sent upstream for `query`
    pub fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("q", query.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
            ("viewbox", self.config.viewbox.clone()),
            ("bounded", "0".to_string()),
            ("accept-language", self.config.language.clone()),
        ]
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Value, GeocodeError> {
        info!("Geocoding query: {}", query);

        let response = self
            .client
            .get(&self.config.url)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        routing::{MethodRouter, get},
    };
    use tokio::net::TcpListener;

    use super::*;

    /// Serve `handler` at `/search` on a local port and return a client for it
    async fn client_for(handler: MethodRouter) -> NominatimClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/search", handler))
                .await
                .unwrap();
        });

        NominatimClient::new(GeocoderConfig {
            url: format!("http://{}/search", addr),
            ..GeocoderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_query_params() {
        let client = NominatimClient::new(GeocoderConfig::default()).unwrap();
        let params = client.query_params("Ayala Center Cebu");

        assert!(params.contains(&("q", "Ayala Center Cebu".to_string())));
        assert!(params.contains(&("limit", "5".to_string())));
        assert!(params.contains(&("bounded", "0".to_string())));
        assert!(params.contains(&("viewbox", "123.80,10.45,124.05,10.20".to_string())));
        assert!(params.contains(&("accept-language", "en".to_string())));
        assert!(params.contains(&("format", "json".to_string())));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let client = NominatimClient::new(GeocoderConfig {
            // Port 9 (discard) on localhost refuses connections
            url: "http://127.0.0.1:9/search".to_string(),
            ..GeocoderConfig::default()
        })
        .unwrap();

        let result = client.search("anything").await;
        assert!(matches!(result, Err(GeocodeError::Request(_))));
    }

    #[tokio::test]
    async fn test_results_pass_through() {
        // Echo the received query back as the single result
        let client = client_for(get(
            |Query(params): Query<HashMap<String, String>>| async move { Json(vec![params]) },
        ))
        .await;

        let results = client.search("Ayala Center Cebu").await.unwrap();
        assert_eq!(results[0]["q"], "Ayala Center Cebu");
        assert_eq!(results[0]["limit"], "5");
        assert_eq!(results[0]["bounded"], "0");
        assert_eq!(results[0]["format"], "json");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let client = client_for(get(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "busy")
        }))
        .await;

        let result = client.search("Cebu").await;
        assert!(matches!(result, Err(GeocodeError::Status(503))));
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_decode_error() {
        let client = client_for(get(|| async { "<html>maintenance</html>" })).await;

        let result = client.search("Cebu").await;
        assert!(matches!(result, Err(GeocodeError::Decode(_))));
    }
}
