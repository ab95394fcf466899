// Applying a filter state to the location records served by the data backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::category::Category;
use crate::filter::{FilterState, LatLng};

const EARTH_RADIUS_METERS: f64 = 6_378_137.0;
const METERS_PER_MILE: f64 = 1609.34;

/// A location record as served by the backend. Product flags are top-level
/// fields and end up in `extra` together with anything else not modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub category: Category,
    /// Additional categories for locations that are more than one kind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Category>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Location {
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        std::iter::once(self.category).chain(self.types.iter().copied())
    }

    pub fn position(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => LatLng::new(lat, lng).ok(),
            _ => None,
        }
    }

    pub fn has_product(&self, key: &str) -> bool {
        self.extra.get(key).is_some_and(to_boolean)
    }
}

/// Availability values in the sheet data are loosely typed.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "t" | "x" | "available"
        ),
        _ => false,
    }
}

/// Great-circle distance in metres.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    #[serde(flatten)]
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_text: Option<String>,
}

pub fn filter_and_sort(locations: impl IntoIterator<Item = Location>, state: &FilterState) -> Vec<Listing> {
    let active = state.active_attributes();
    let center = state.search_center();
    let radius_meters = state.search_radius() * METERS_PER_MILE;

    let mut listings: Vec<Listing> = locations
        .into_iter()
        .filter(|location| location.categories().any(|c| state.categories().contains(&c)))
        .filter(|location| active.iter().all(|key| location.has_product(key)))
        .filter_map(|location| {
            let Some(center) = center else {
                return Some(Listing {
                    location,
                    distance_miles: None,
                    distance_text: None,
                });
            };
            let meters = distance_meters(center, location.position()?);
            if radius_meters > 0.0 && meters > radius_meters {
                return None;
            }
            let miles = meters / METERS_PER_MILE;
            Some(Listing {
                location,
                distance_miles: Some(miles),
                distance_text: Some(format!("{:.1} mi", miles)),
            })
        })
        .collect();

    if center.is_some() {
        listings.sort_by(|a, b| match (a.distance_miles, b.distance_miles) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
    listings
}
