//! Caller-location resolution
//!
//! The location hint is optional everywhere downstream. It comes from an
//! explicit `--location` flag, or from a single lookup against a configured
//! IP-geolocation endpoint (ip-api.com JSON shape). Lookup failure is never
//! fatal: it logs a warning and the itinerary request goes out without the
//! hint.

use std::time::Duration;

use eyre::{Result, WrapErr, bail, ensure, eyre};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GeoConfig;
use crate::genai::LatLng;

/// Parse a `LAT,LNG` flag value
pub fn parse_latlng(input: &str) -> Result<LatLng> {
    debug!(%input, "parse_latlng: called");
    let Some((lat, lng)) = input.split_once(',') else {
        bail!("Expected LAT,LNG (e.g. 37.77,-122.42), got '{input}'");
    };

    let latitude: f64 = lat
        .trim()
        .parse()
        .wrap_err_with(|| format!("Invalid latitude '{}'", lat.trim()))?;
    let longitude: f64 = lng
        .trim()
        .parse()
        .wrap_err_with(|| format!("Invalid longitude '{}'", lng.trim()))?;

    ensure!((-90.0..=90.0).contains(&latitude), "Latitude {latitude} out of range");
    ensure!(
        (-180.0..=180.0).contains(&longitude),
        "Longitude {longitude} out of range"
    );

    Ok(LatLng { latitude, longitude })
}

/// ip-api.com style response body
#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolve the caller location once, warning-only on failure
pub async fn lookup(config: &GeoConfig) -> Option<LatLng> {
    if !config.enabled {
        debug!("lookup: geolocation disabled");
        return None;
    }

    match try_lookup(config).await {
        Ok(location) => {
            debug!(?location, "lookup: resolved");
            Some(location)
        }
        Err(error) => {
            warn!(error = %error, "Could not resolve caller location");
            None
        }
    }
}

async fn try_lookup(config: &GeoConfig) -> Result<LatLng> {
    debug!(endpoint = %config.endpoint, "try_lookup: called");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()?;

    let response = client.get(&config.endpoint).send().await?;
    ensure!(
        response.status().is_success(),
        "Geolocation endpoint returned {}",
        response.status()
    );

    let body: GeoIpResponse = response.json().await?;
    if let Some(status) = &body.status {
        ensure!(status == "success", "Geolocation endpoint reported status '{status}'");
    }

    let latitude = body.lat.ok_or_else(|| eyre!("Geolocation response missing 'lat'"))?;
    let longitude = body.lon.ok_or_else(|| eyre!("Geolocation response missing 'lon'"))?;

    Ok(LatLng { latitude, longitude })
}
