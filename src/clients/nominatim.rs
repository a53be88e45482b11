//! Reverse geocoding against a Nominatim instance

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Address, ReverseGeocoder};
use crate::utils::{SyndicationError, SyndicationResult};

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<RawAddress>,
}

/// Nominatim names the locality differently depending on its size
#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    road: Option<String>,
    postcode: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl From<RawAddress> for Address {
    fn from(raw: RawAddress) -> Self {
        Address {
            road: raw.road.unwrap_or_default(),
            postcode: raw.postcode.unwrap_or_default(),
            city: raw.city.or(raw.town).or(raw.village).unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
        }
    }
}

/// Parse a `format=json` reverse response
///
/// A response without an address (open sea, unknown area) yields a blank
/// address rather than an error.
pub(crate) fn parse_reverse_response(body: &str) -> SyndicationResult<Address> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    Ok(response.address.map(Address::from).unwrap_or_default())
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    /// `client` must carry an identifying user agent
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> SyndicationResult<Address> {
        debug!("Reverse geocoding {},{}", latitude, longitude);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyndicationError::UpstreamFetch(format!(
                "geocoder returned HTTP {status}"
            )));
        }

        parse_reverse_response(&response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn town_stands_in_for_city() {
        let address = parse_reverse_response(
            r#"{"address": {"road": "Main St", "town": "Otley", "country": "United Kingdom"}}"#,
        )
        .unwrap();
        assert_eq!(address.city, "Otley");
        assert_eq!(address.road, "Main St");
        assert_eq!(address.postcode, "");
    }

    #[test]
    fn missing_address_is_blank() {
        let address = parse_reverse_response(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(address, Address::default());
    }

    #[test]
    fn garbage_is_an_invalid_response() {
        assert!(matches!(
            parse_reverse_response("<html>"),
            Err(SyndicationError::InvalidResponse(_))
        ));
    }
}
