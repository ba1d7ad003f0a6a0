//! Forward geocoding against the public Nominatim service.

use serde::Deserialize;
use url::Url;

use super::fetch::FetchError;
use crate::geo::LngLat;

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const RESULT_LIMIT: u32 = 5;

const ACCEPT_LANGUAGE: &str = "es-ES,es";

/// One geocoder match. Nominatim serializes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub display_name: String,
    lat: String,
    lon: String,
}

impl Place {
    /// Leading segment of the display name, shown as the result title.
    pub fn name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .unwrap_or(&self.display_name)
            .trim()
    }

    /// Parsed coordinates; `None` when the strings are malformed.
    pub fn position(&self) -> Option<LngLat> {
        let lat = self.lat.parse().ok()?;
        let lon = self.lon.parse().ok()?;
        Some(LngLat { lon, lat })
    }
}

/// Look up `query`. Transport failures and non-2xx statuses both surface as
/// `FetchError`, which the UI renders as its search-error message.
pub fn search(client: &reqwest::blocking::Client, query: &str) -> Result<Vec<Place>, FetchError> {
    let mut url = Url::parse(NOMINATIM_ENDPOINT)
        .map_err(|e| FetchError::new(format!("Invalid endpoint: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("q", query)
        .append_pair("limit", &RESULT_LIMIT.to_string())
        .append_pair("addressdetails", "1");

    log::debug!("geocoding {:?}", query);

    let response = client
        .get(url.as_str())
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .send()
        .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(format!("Status {}", status.as_u16())));
    }

    response
        .json()
        .map_err(|e| FetchError::new(format!("Failed to read body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_deserializes_from_nominatim_row() {
        let row = r#"{
            "display_name": "Malecón 2000, Guayaquil, Guayas, Ecuador",
            "lat": "-2.1936",
            "lon": "-79.8795",
            "class": "tourism"
        }"#;
        let place: Place = serde_json::from_str(row).unwrap();
        assert_eq!(place.name(), "Malecón 2000");
        let pos = place.position().unwrap();
        assert!((pos.lat - -2.1936).abs() < 1e-9);
        assert!((pos.lon - -79.8795).abs() < 1e-9);
    }

    #[test]
    fn name_without_commas_is_the_full_display_name() {
        let place: Place = serde_json::from_str(
            r#"{"display_name": "Guayaquil", "lat": "-2.17", "lon": "-79.92"}"#,
        )
        .unwrap();
        assert_eq!(place.name(), "Guayaquil");
    }

    #[test]
    fn malformed_coordinates_yield_no_position() {
        let place: Place = serde_json::from_str(
            r#"{"display_name": "x", "lat": "n/a", "lon": "-79.92"}"#,
        )
        .unwrap();
        assert!(place.position().is_none());
    }
}
