// The filter state is the single source of truth for what is being searched.
// It is decoded from the URL at startup, mutated by user actions and encoded
// back into the URL; it is never destroyed, only reset.

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

use crate::category::Category;
use crate::error::{Error, Result};
use crate::product::is_valid_attribute;

pub const DEFAULT_SEARCH_RADIUS: f64 = 25.0;
pub const MIN_SEARCH_RADIUS: f64 = 5.0;
pub const MAX_SEARCH_RADIUS: f64 = 100.0;

/// A radius inside `[MIN_SEARCH_RADIUS, MAX_SEARCH_RADIUS]`, or the default.
pub fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() && (MIN_SEARCH_RADIUS..=MAX_SEARCH_RADIUS).contains(&radius) {
        radius
    } else {
        DEFAULT_SEARCH_RADIUS
    }
}

fn default_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if Self::in_range(lat, lng) {
            Ok(Self { lat, lng })
        } else {
            Err(Error::InvalidCoordinates(lat, lng))
        }
    }

    pub fn in_range(lat: f64, lng: f64) -> bool {
        lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
    }
}

/// A place picked by the user as the search center.
/// Without a position the location is incomplete and acts as no location for the URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchLocation {
    pub position: Option<LatLng>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl SearchLocation {
    /// A bare coordinate, as decoded from a URL.
    pub fn at(position: LatLng) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.position.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    categories: BTreeSet<Category>,
    #[serde(default)]
    attributes: BTreeMap<String, bool>,
    #[serde(default)]
    search_location: Option<SearchLocation>,
    #[serde(default = "default_radius")]
    search_radius: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categories: Category::all(),
            attributes: BTreeMap::new(),
            search_location: None,
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }
}

impl FilterState {
    pub fn new(categories: BTreeSet<Category>) -> Self {
        Self {
            categories,
            ..Default::default()
        }
    }

    /// Assemble a state from decoded parts. Attributes are taken as-is; callers
    /// that need them checked against the categories follow up with
    /// [`FilterState::retain_valid_attributes`]. The radius is sanitized.
    pub fn from_parts(
        categories: BTreeSet<Category>,
        attributes: BTreeMap<String, bool>,
        search_location: Option<SearchLocation>,
        search_radius: f64,
    ) -> Self {
        Self {
            categories,
            attributes,
            search_location,
            search_radius: sanitize_radius(search_radius),
        }
    }

    // MARK: Accessors

    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn attributes(&self) -> &BTreeMap<String, bool> {
        &self.attributes
    }

    pub fn search_location(&self) -> Option<&SearchLocation> {
        self.search_location.as_ref()
    }

    /// Search center, if the location is present and complete.
    pub fn search_center(&self) -> Option<LatLng> {
        self.search_location.as_ref().and_then(|l| l.position)
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Keys of attributes switched on, sorted.
    pub fn active_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, on)| **on)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn has_all_categories(&self) -> bool {
        self.categories == Category::all()
    }

    /// Every category and no attribute: what "clear filters" produces.
    pub fn is_clear(&self) -> bool {
        self.has_all_categories() && self.active_attributes().is_empty()
    }

    /// Same as the homepage with no URL parameters.
    pub fn is_default(&self) -> bool {
        self.is_clear() && self.search_location.is_none() && self.search_radius == DEFAULT_SEARCH_RADIUS
    }

    /// Equal as far as the URL is concerned: switched-off attributes and
    /// location names are ignored.
    pub fn is_equivalent(&self, other: &FilterState) -> bool {
        self.categories == other.categories
            && self.active_attributes() == other.active_attributes()
            && self.search_center() == other.search_center()
            && self.search_radius == other.search_radius
    }

    // MARK: Mutations

    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
        self.retain_valid_attributes();
    }

    pub fn set_categories(&mut self, categories: BTreeSet<Category>) {
        self.categories = categories;
        self.retain_valid_attributes();
    }

    /// Set an attribute flag. Keys not offered by any selected category are rejected
    /// and leave the state unchanged.
    pub fn set_attribute(&mut self, key: &str, on: bool) -> Result<()> {
        if !is_valid_attribute(key, &self.categories) {
            return Err(Error::InvalidAttribute(key.to_string()));
        }
        self.attributes.insert(key.to_string(), on);
        Ok(())
    }

    pub fn toggle_attribute(&mut self, key: &str) -> Result<bool> {
        let on = !self.attributes.get(key).copied().unwrap_or(false);
        self.set_attribute(key, on)?;
        Ok(on)
    }

    /// Drop attribute keys that none of the selected categories offers.
    pub fn retain_valid_attributes(&mut self) {
        let categories = &self.categories;
        self.attributes.retain(|key, _| is_valid_attribute(key, categories));
    }

    pub fn set_search_location(&mut self, location: Option<SearchLocation>) {
        self.search_location = location;
    }

    /// Out-of-range or non-finite values fall back to the default radius.
    pub fn set_search_radius(&mut self, radius: f64) {
        self.search_radius = sanitize_radius(radius);
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}
