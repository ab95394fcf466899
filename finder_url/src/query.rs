// Attributes, search center and radius live in the query string.

use url::form_urlencoded;

use std::collections::BTreeMap;

use finder_core::filter::{sanitize_radius, DEFAULT_SEARCH_RADIUS};
use finder_core::{Category, FilterState, LatLng, SearchLocation};
use finder_util::{build_params, parse_float_prefix, parse_query_str};

pub const PRODUCTS_PARAM: &str = "products";
pub const LAT_PARAM: &str = "lat";
pub const LNG_PARAM: &str = "lng";
pub const RADIUS_PARAM: &str = "radius";

/// Query string without the leading `?`; empty when nothing differs from the defaults.
/// Categories are not part of it.
pub fn encode_filters_to_url(state: &FilterState) -> String {
    let active = state.active_attributes();
    let products = (!active.is_empty()).then(|| active.join(","));
    let center = state.search_center();
    let lat = center.map(|c| format!("{:.2}", c.lat));
    let lng = center.map(|c| format!("{:.2}", c.lng));
    let radius = (state.search_radius() != DEFAULT_SEARCH_RADIUS).then(|| state.search_radius());

    let params = build_params! {
        optional products,
        optional lat,
        optional lng,
        optional radius,
    };
    form_urlencoded::Serializer::new(String::new()).extend_pairs(params).finish()
}

/// Decode the query string. Categories come from the path, so the result carries
/// every category; unknown parameters (including a legacy `types`) are ignored.
pub fn parse_filters_from_url(query: &str) -> FilterState {
    let params = parse_query_str(query);

    let attributes: BTreeMap<String, bool> = params
        .get(PRODUCTS_PARAM)
        .map(|products| {
            products
                .split(',')
                .filter(|token| !token.is_empty())
                .map(|token| (token.to_string(), true))
                .collect()
        })
        .unwrap_or_default();

    let radius = params
        .get(RADIUS_PARAM)
        .and_then(|r| parse_float_prefix(r))
        .map(sanitize_radius)
        .unwrap_or(DEFAULT_SEARCH_RADIUS);

    let lat = params.get(LAT_PARAM).and_then(|v| parse_float_prefix(v));
    let lng = params.get(LNG_PARAM).and_then(|v| parse_float_prefix(v));
    let location = match (lat, lng) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng).ok().map(SearchLocation::at),
        _ => None,
    };

    FilterState::from_parts(Category::all(), attributes, location, radius)
}
