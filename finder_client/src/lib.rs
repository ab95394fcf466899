mod cache;
mod error;
mod result;
mod retry;
#[cfg(test)]
mod test;
mod transport;

use reqwest::Url;
use serde_json::Value;
use tokio::time::Duration;
use tracing::warn;

use finder_core::listing::Location;
use finder_util::build_params;

pub use crate::cache::*;
pub use crate::error::{Error, Result};
pub use crate::result::*;
pub use crate::retry::*;
pub use crate::transport::*;

pub const LOCATIONS_MAX_RETRIES: usize = 3;
pub const LOCATIONS_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const GEOCODE_MAX_RETRIES: usize = 2;
pub const GEOCODE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Client of the location-data backend. Every call goes through the request cache.
pub struct LocationClient<T: Transport = HttpTransport> {
    base_url: Url,
    cache: RequestCache<T>,
    locations_ttl: Duration,
}

impl LocationClient<HttpTransport> {
    pub fn new(base_url: &str, locations_ttl: Duration) -> Result<Self> {
        Self::with_transport(base_url, HttpTransport::new()?, locations_ttl)
    }
}

impl<T: Transport> LocationClient<T> {
    pub fn with_transport(base_url: &str, transport: T, locations_ttl: Duration) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            cache: RequestCache::new(transport),
            locations_ttl,
        })
    }

    pub fn cache(&self) -> &RequestCache<T> {
        &self.cache
    }

    /// Every location record. Records that do not parse are skipped.
    pub async fn locations(&self) -> Result<Vec<Location>> {
        let url = self.endpoint("/api/locations", Vec::new())?;
        let options = RequestOptions::default();
        let retry = RetryOptions::new(LOCATIONS_MAX_RETRIES, LOCATIONS_RETRY_DELAY);
        let records: Vec<Value> = retry_async(
            || self.cache.fetch(url.as_str(), &options, Some(self.locations_ttl)),
            &retry,
        )
        .await?;

        let total = records.len();
        let locations: Vec<Location> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Location>(record) {
                Ok(location) => Some(location),
                Err(e) => {
                    warn!("Skipping malformed location record: {}", e);
                    None
                }
            })
            .collect();
        if locations.len() < total {
            warn!("Kept {} of {} location records", locations.len(), total);
        }
        Ok(locations)
    }

    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult> {
        let address = address.trim();
        let url = self.endpoint("/api/geocode", build_params! { required address })?;
        let options = RequestOptions::default();
        let retry = RetryOptions::new(GEOCODE_MAX_RETRIES, GEOCODE_RETRY_DELAY);
        retry_async(|| self.cache.fetch(url.as_str(), &options, None), &retry).await
    }

    pub async fn place_details(&self, place_id: &str, fields: Option<&str>) -> Result<PlaceDetails> {
        let params = build_params! {
            required placeId => place_id,
            optional fields,
        };
        let url = self.endpoint("/api/places/details", params)?;
        self.cache.fetch(url.as_str(), &RequestOptions::default(), None).await
    }

    fn endpoint(&self, path: &str, params: Vec<(String, String)>) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}
