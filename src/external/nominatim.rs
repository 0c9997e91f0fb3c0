use crate::config::GeocoderConfig;
use crate::error::AppResult;
use reqwest::Client;
use serde::Deserialize;

/// One geocoder hit, coordinates parsed out of Nominatim's string fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Clone)]
pub struct NominatimService {
    client: Client,
    config: GeocoderConfig,
}

impl NominatimService {
    pub fn new(config: GeocoderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Resolves a free-text address to coordinates. Returns `None` when the
    /// geocoder has no match or the call fails; the caller turns that into a
    /// validation error rather than a gateway error.
    pub async fn geocode(&self, address: &str) -> AppResult<Option<GeocodedPlace>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let result = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                log::error!("Geocode request failed: {e}");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            log::error!("Geocoder returned status {}", response.status());
            return Ok(None);
        }

        let hits: Vec<NominatimHit> = match response.json().await {
            Ok(h) => h,
            Err(e) => {
                log::error!("Geocode response parse failed: {e}");
                return Ok(None);
            }
        };

        let Some(place) = hits.into_iter().next() else {
            return Ok(None);
        };

        let (Ok(latitude), Ok(longitude)) = (place.lat.parse(), place.lon.parse()) else {
            log::error!("Geocoder returned unparseable coordinates for {address}");
            return Ok(None);
        };

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            display_name: place.display_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_deserializes_string_coordinates() {
        let json = r#"[{"lat":"28.6139","lon":"77.2090","display_name":"Rampur, India"}]"#;
        let hits: Vec<NominatimHit> = serde_json::from_str(json).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name, "Rampur, India");
        assert_eq!(hits[0].lat.parse::<f64>().unwrap(), 28.6139);
    }
}
