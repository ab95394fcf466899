use serde::Serialize;

use finder_core::category::ColorTokens;
use finder_core::listing::Listing;
use finder_core::product::{group_order, products, Product};
use finder_core::Category;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: &'static str,
    pub slug: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub emoji: &'static str,
    pub colors: ColorTokens,
    pub detail_base_path: &'static str,
    pub product_groups: &'static [&'static str],
    pub products: &'static [Product],
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        let display = category.display();
        Self {
            id: category.id(),
            slug: category.slug(),
            singular: display.singular,
            plural: display.plural,
            emoji: display.emoji,
            colors: display.colors,
            detail_base_path: category.detail_base_path(),
            product_groups: group_order(category),
            products: products(category),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationsResponse {
    /// Canonical URL of the filter the listings were selected with
    pub url: String,
    pub count: usize,
    pub listings: Vec<Listing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareResponse {
    pub url: String,
}
