use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;

use finder_core::{LatLng, SearchLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl GeocodeResult {
    /// `None` when the coordinates are out of range.
    pub fn to_search_location(&self) -> Option<SearchLocation> {
        let position = LatLng::new(self.lat, self.lng).ok()?;
        let formatted_address = self.formatted_address.clone().unwrap_or_default();
        Some(SearchLocation {
            position: Some(position),
            name: self.name.clone().unwrap_or_else(|| formatted_address.clone()),
            formatted_address,
            place_id: self.place_id.clone(),
        })
    }
}

/// Place details come back with whichever fields were asked for.
pub type PlaceDetails = BTreeMap<String, Value>;
