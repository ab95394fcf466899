use std::collections::BTreeSet;

use finder_core::FilterState;
use finder_util::{path_segments, split_path_and_query};

use crate::path::{encode_categories_to_path, parse_categories_from_path};
use crate::query::{encode_filters_to_url, parse_filters_from_url};

pub const ALL_ROUTE: &str = "/all";
pub const UNDECIDED_ROUTE: &str = "/undecided";

/// The canonical URL of a state: route plus query string, if any.
pub fn target_url(state: &FilterState) -> String {
    let path = if state.categories().is_empty() {
        UNDECIDED_ROUTE.to_string()
    } else if state.is_clear() {
        ALL_ROUTE.to_string()
    } else {
        format!("/{}", encode_categories_to_path(state.categories()))
    };

    let query = encode_filters_to_url(state);
    if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query)
    }
}

/// Decode categories from the first path segment and everything else from the query.
/// Attributes no selected category offers are dropped. The undecided route decodes
/// to an empty selection.
pub fn decode_url(path: &str, query: &str) -> FilterState {
    let first = path_segments(path).first().copied();
    let categories = if first == UNDECIDED_ROUTE.strip_prefix('/') {
        BTreeSet::new()
    } else {
        parse_categories_from_path(first)
    };
    let mut state = parse_filters_from_url(query);
    state.set_categories(categories);
    state
}

/// [`decode_url`] on a relative URL such as `/farm-stand?radius=50`.
pub fn decode_relative_url(url: &str) -> FilterState {
    let (path, query) = split_path_and_query(url);
    decode_url(path, query)
}
