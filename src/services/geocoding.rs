//! Address geocoding service
//!
//! Looks up coordinates through the French national address API
//! (`/search/?q=...`), which answers GeoJSON feature collections.

use std::time::Duration;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::config::settings::GeocodingConfig;
use crate::utils::errors::{ConcertError, GeocodingError, GeocodingResult, Result};
use crate::utils::geo::GeoPoint;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// GeoJSON order: longitude, latitude
    coordinates: Vec<f64>,
}

/// Geocoding service
#[derive(Debug, Clone)]
pub struct GeocodingService {
    client: Client,
    api_url: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("concert-chaussettes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConcertError::Http)?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best match for a free-text address or city
    pub async fn geocode(&self, query: &str) -> GeocodingResult<GeoPoint> {
        let url = format!("{}/search/", self.api_url);
        debug!(query = query, url = %url, "Geocoding address");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout
                } else {
                    GeocodingError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeocodingError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        let collection: FeatureCollection = response
            .json()
            .await
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

        let feature = collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::NoMatch(query.to_string()))?;

        match feature.geometry.coordinates.as_slice() {
            [longitude, latitude, ..] => {
                let point = GeoPoint::new(*latitude, *longitude);
                if point.is_valid() {
                    Ok(point)
                } else {
                    Err(GeocodingError::InvalidResponse(format!("coordinates out of range: {:?}", point)))
                }
            }
            _ => Err(GeocodingError::InvalidResponse("missing coordinates".to_string())),
        }
    }
}
