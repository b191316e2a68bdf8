//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows at most one request per second; pacing is the
//! caller's job (see [`crate::processors::RateLimiter`]).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use std::time::Duration;

use crate::config::GeocoderSettings;
use crate::error::{ProcessingError, Result};
use crate::models::GeoPoint;
use crate::services::GeocodingService;

const SERVICE: &str = "Nominatim";

pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    forward_timeout: Duration,
    reverse_timeout: Duration,
}

impl NominatimClient {
    pub fn new(settings: &GeocoderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            forward_timeout: Duration::from_secs(settings.forward_timeout_secs),
            reverse_timeout: Duration::from_secs(settings.reverse_timeout_secs),
        })
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(query)
            .timeout(timeout)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProcessingError::service(SERVICE, "rate limited (HTTP 429)"));
        }

        let body = resp.error_for_status()?.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl GeocodingService for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<GeoPoint>> {
        let body = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("addressdetails", "1".to_string()),
                    ("limit", "1".to_string()),
                ],
                self.forward_timeout,
            )
            .await?;

        parse_search_response(&body)
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let body = self
            .get_json(
                "reverse",
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("addressdetails", "1".to_string()),
                ],
                self.reverse_timeout,
            )
            .await?;

        parse_reverse_response(&body)
    }
}

/// Parses a `/search` response: an array of places, best match first.
fn parse_search_response(body: &serde_json::Value) -> Result<Option<GeoPoint>> {
    let results = body
        .as_array()
        .ok_or_else(|| ProcessingError::service(SERVICE, "search response is not an array"))?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = parse_coordinate(&first["lat"])
        .ok_or_else(|| ProcessingError::service(SERVICE, "missing lat in search response"))?;
    let longitude = parse_coordinate(&first["lon"])
        .ok_or_else(|| ProcessingError::service(SERVICE, "missing lon in search response"))?;

    Ok(Some(GeoPoint {
        latitude,
        longitude,
        region: state_of(first),
    }))
}

/// Parses a `/reverse` response: a single place, or `{"error": ..}` when
/// nothing is there.
fn parse_reverse_response(body: &serde_json::Value) -> Result<Option<String>> {
    if body.get("error").is_some() {
        return Ok(None);
    }

    if !body.is_object() {
        return Err(ProcessingError::service(SERVICE, "reverse response is not an object"));
    }

    Ok(state_of(body))
}

fn state_of(place: &serde_json::Value) -> Option<String> {
    place["address"]["state"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

// Nominatim sends coordinates as strings; accept numbers too.
fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
}
