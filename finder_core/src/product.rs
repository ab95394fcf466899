// Product taxonomy: the attribute keys each category can be filtered by.
// Keys are the column names of the location data, so they double as URL tokens.

use itertools::Itertools;
use serde::Serialize;

use std::collections::BTreeSet;

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    pub key: &'static str,
    pub name: &'static str,
    /// Heading the product is listed under in the filter panel.
    pub group: &'static str,
}

const fn product(key: &'static str, name: &'static str, group: &'static str) -> Product {
    Product { key, name, group }
}

static FARM_STAND_PRODUCTS: &[Product] = &[
    product("beef", "Beef", "Meats"),
    product("pork", "Pork", "Meats"),
    product("lamb", "Lamb", "Meats"),
    product("chicken", "Chicken", "Poultry & Eggs"),
    product("turkey", "Turkey", "Poultry & Eggs"),
    product("duck", "Duck", "Poultry & Eggs"),
    product("eggs", "Eggs", "Poultry & Eggs"),
    product("corn", "Corn", "Vegetables"),
    product("carrots", "Carrots", "Vegetables"),
    product("potatoes", "Potatoes", "Vegetables"),
    product("lettuce", "Lettuce", "Vegetables"),
    product("spinach", "Spinach", "Vegetables"),
    product("squash", "Squash", "Vegetables"),
    product("tomatoes", "Tomatoes", "Vegetables"),
    product("peppers", "Peppers", "Vegetables"),
    product("cucumbers", "Cucumbers", "Vegetables"),
    product("zucchini", "Zucchini", "Vegetables"),
    product("strawberries", "Strawberries", "Fruits"),
    product("blueberries", "Blueberries", "Fruits"),
    product("garlic", "Garlic", "Aromatics"),
    product("onions", "Onions", "Aromatics"),
];

static CHEESE_SHOP_PRODUCTS: &[Product] = &[
    product("cheddar", "Cheddar", "Cheese Types"),
    product("brie", "Brie", "Cheese Types"),
    product("gouda", "Gouda", "Cheese Types"),
    product("mozzarella", "Mozzarella", "Cheese Types"),
    product("feta", "Feta", "Cheese Types"),
    product("blue_cheese", "Blue Cheese", "Cheese Types"),
    product("parmesan", "Parmesan", "Cheese Types"),
    product("swiss", "Swiss", "Cheese Types"),
    product("provolone", "Provolone", "Cheese Types"),
    product("cow_milk", "Cow Milk", "Milk Source"),
    product("goat_milk", "Goat Milk", "Milk Source"),
    product("sheep_milk", "Sheep Milk", "Milk Source"),
];

static FISH_MONGER_PRODUCTS: &[Product] = &[
    product("salmon", "Salmon", "Fish"),
    product("cod", "Cod", "Fish"),
    product("haddock", "Haddock", "Fish"),
    product("tuna", "Tuna", "Fish"),
    product("halibut", "Halibut", "Fish"),
    product("lobster", "Lobster", "Shellfish"),
    product("shrimp", "Shrimp", "Shellfish"),
    product("crab", "Crab", "Shellfish"),
    product("oysters", "Oysters", "Shellfish"),
    product("clams", "Clams", "Shellfish"),
    product("mussels", "Mussels", "Shellfish"),
    product("scallops", "Scallops", "Shellfish"),
];

static BUTCHER_PRODUCTS: &[Product] = &[
    product("beef", "Beef", "Fresh Meats"),
    product("pork", "Pork", "Fresh Meats"),
    product("lamb", "Lamb", "Fresh Meats"),
    product("veal", "Veal", "Fresh Meats"),
    product("chicken", "Chicken", "Poultry"),
    product("turkey", "Turkey", "Poultry"),
    product("duck", "Duck", "Poultry"),
    product("sausages", "Sausages", "Prepared Meats"),
    product("bacon", "Bacon", "Prepared Meats"),
    product("ground_meat", "Ground Meat", "Prepared Meats"),
    product("steaks", "Steaks", "Cuts"),
    product("roasts", "Roasts", "Cuts"),
];

static ANTIQUE_SHOP_PRODUCTS: &[Product] = &[
    product("furniture", "Furniture", "Furniture & Decor"),
    product("art", "Art", "Furniture & Decor"),
    product("jewelry", "Jewelry", "Jewelry & Accessories"),
    product("vintage_clothing", "Vintage Clothing", "Jewelry & Accessories"),
    product("books", "Books", "Collectibles"),
    product("collectibles", "Collectibles", "Collectibles"),
    product("ceramics", "Ceramics", "Tableware"),
    product("glassware", "Glassware", "Tableware"),
    product("silverware", "Silverware", "Tableware"),
    product("textiles", "Textiles", "Textiles"),
];

static BREWERY_PRODUCTS: &[Product] = &[
    product("ipa", "IPA", "Beer Styles"),
    product("lager", "Lager", "Beer Styles"),
    product("stout", "Stout", "Beer Styles"),
    product("ale", "Ale", "Beer Styles"),
    product("pilsner", "Pilsner", "Beer Styles"),
    product("wheat_beer", "Wheat Beer", "Beer Styles"),
    product("tours", "Tours", "Offerings"),
    product("tastings", "Tastings", "Offerings"),
    product("food", "Food", "Offerings"),
    product("outdoor_seating", "Outdoor Seating", "Offerings"),
];

static WINERY_PRODUCTS: &[Product] = &[
    product("red_wine", "Red Wine", "Wine Types"),
    product("white_wine", "White Wine", "Wine Types"),
    product("rose", "Rosé", "Wine Types"),
    product("sparkling", "Sparkling", "Wine Types"),
    product("dessert_wine", "Dessert Wine", "Wine Types"),
    product("tours", "Tours", "Offerings"),
    product("tastings", "Tastings", "Offerings"),
    product("food", "Food", "Offerings"),
    product("vineyard_views", "Vineyard Views", "Offerings"),
    product("events", "Events", "Offerings"),
];

static SUGAR_SHACK_PRODUCTS: &[Product] = &[
    product("maple_syrup", "Maple Syrup", "Maple Products"),
    product("maple_candy", "Maple Candy", "Maple Products"),
    product("maple_cream", "Maple Cream", "Maple Products"),
    product("maple_sugar", "Maple Sugar", "Maple Products"),
    product("tours", "Tours", "Experiences"),
    product("tastings", "Tastings", "Experiences"),
    product("pancake_breakfast", "Pancake Breakfast", "Experiences"),
    product("seasonal_events", "Seasonal Events", "Experiences"),
];

pub fn products(category: Category) -> &'static [Product] {
    match category {
        Category::FarmStand => FARM_STAND_PRODUCTS,
        Category::CheeseShop => CHEESE_SHOP_PRODUCTS,
        Category::FishMonger => FISH_MONGER_PRODUCTS,
        Category::Butcher => BUTCHER_PRODUCTS,
        Category::AntiqueShop => ANTIQUE_SHOP_PRODUCTS,
        Category::Brewery => BREWERY_PRODUCTS,
        Category::Winery => WINERY_PRODUCTS,
        Category::SugarShack => SUGAR_SHACK_PRODUCTS,
    }
}

/// Order in which product groups are listed for a category.
pub fn group_order(category: Category) -> &'static [&'static str] {
    match category {
        Category::FarmStand => &["Meats", "Poultry & Eggs", "Vegetables", "Fruits", "Aromatics"],
        Category::CheeseShop => &["Cheese Types", "Milk Source"],
        Category::FishMonger => &["Fish", "Shellfish"],
        Category::Butcher => &["Fresh Meats", "Poultry", "Prepared Meats", "Cuts"],
        Category::AntiqueShop => &[
            "Furniture & Decor",
            "Jewelry & Accessories",
            "Collectibles",
            "Tableware",
            "Textiles",
        ],
        Category::Brewery => &["Beer Styles", "Offerings"],
        Category::Winery => &["Wine Types", "Offerings"],
        Category::SugarShack => &["Maple Products", "Experiences"],
    }
}

/// Union of the product keys offered by the given categories.
pub fn product_keys_for<'a>(categories: impl IntoIterator<Item = &'a Category>) -> BTreeSet<&'static str> {
    categories
        .into_iter()
        .flat_map(|c| products(*c).iter().map(|p| p.key))
        .collect()
}

pub fn is_valid_attribute(key: &str, categories: &BTreeSet<Category>) -> bool {
    categories.iter().any(|c| products(*c).iter().any(|p| p.key == key))
}

/// Products of several categories with shared keys listed once.
/// The first category (in declaration order) defining a key wins.
pub fn merged_products(categories: &BTreeSet<Category>) -> Vec<Product> {
    categories
        .iter()
        .flat_map(|c| products(*c).iter().copied())
        .unique_by(|p| p.key)
        .collect()
}
