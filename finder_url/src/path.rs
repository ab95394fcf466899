// Categories live in the first path segment: `/all`, `/farm-stand`, `/cheese-shop+farm-stand`.

use itertools::Itertools;

use std::collections::BTreeSet;

use finder_core::Category;
use finder_util::path_segments;

pub const ALL_TOKEN: &str = "all";
pub const SLUG_SEPARATOR: char = '+';

/// `all` for the full set, sorted slugs joined with `+` otherwise, empty for no selection.
pub fn encode_categories_to_path(categories: &BTreeSet<Category>) -> String {
    if *categories == Category::all() {
        return ALL_TOKEN.to_string();
    }
    categories.iter().map(|c| c.slug()).sorted().join("+")
}

/// Never fails: a missing, empty, `all` or entirely unrecognized path gives every category.
pub fn parse_categories_from_path(path: Option<&str>) -> BTreeSet<Category> {
    let Some(path) = path else {
        return Category::all();
    };
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() || path == ALL_TOKEN {
        return Category::all();
    }
    let categories: BTreeSet<Category> = path.split(SLUG_SEPARATOR).filter_map(Category::from_slug).collect();
    if categories.is_empty() {
        tracing::debug!("no known category in path {:?}, using all", path);
        return Category::all();
    }
    categories
}

/// `/all`, or a single segment made only of known slugs. Any further `/`, a trailing
/// one included, rules the path out.
pub fn is_category_page(pathname: &str) -> bool {
    let path = pathname.strip_prefix('/').unwrap_or(pathname);
    if path.is_empty() || path.contains('/') {
        return false;
    }
    path == ALL_TOKEN || path.split(SLUG_SEPARATOR).all(|token| Category::from_slug(token).is_some())
}

/// Detail pages are recognized by depth alone.
pub fn is_detail_path(pathname: &str) -> bool {
    path_segments(pathname).len() >= 2
}

pub fn detail_path(category: Category, slug: &str) -> String {
    format!("{}/{}", category.detail_base_path(), urlencoding::encode(slug))
}
