// The closed set of location categories and their static metadata.
// Identifiers are the snake_case tokens used by the data backend,
// slugs are the kebab-case tokens used in URL paths.

use phf::phf_map;
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A kind of location shown on the map. Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FarmStand,
    CheeseShop,
    FishMonger,
    Butcher,
    AntiqueShop,
    Brewery,
    Winery,
    SugarShack,
}

pub const ALL_CATEGORIES: [Category; 8] = [
    Category::FarmStand,
    Category::CheeseShop,
    Category::FishMonger,
    Category::Butcher,
    Category::AntiqueShop,
    Category::Brewery,
    Category::Winery,
    Category::SugarShack,
];

static SLUG_TO_CATEGORY: phf::Map<&'static str, Category> = phf_map! {
    "farm-stand" => Category::FarmStand,
    "cheese-shop" => Category::CheeseShop,
    "fish-monger" => Category::FishMonger,
    "butcher" => Category::Butcher,
    "antique-shop" => Category::AntiqueShop,
    "brewery" => Category::Brewery,
    "winery" => Category::Winery,
    "sugar-shack" => Category::SugarShack,
};

/// Styling tokens handed to the front-end: badge classes, marker fill and marker glow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTokens {
    pub badge: &'static str,
    pub marker: &'static str,
    pub glow: &'static str,
}

/// User-facing names of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDisplay {
    pub singular: &'static str,
    pub plural: &'static str,
    pub emoji: &'static str,
    pub colors: ColorTokens,
}

impl Category {
    /// The full closed set.
    pub fn all() -> BTreeSet<Category> {
        ALL_CATEGORIES.into_iter().collect()
    }

    pub fn id(self) -> &'static str {
        match self {
            Category::FarmStand => "farm_stand",
            Category::CheeseShop => "cheese_shop",
            Category::FishMonger => "fish_monger",
            Category::Butcher => "butcher",
            Category::AntiqueShop => "antique_shop",
            Category::Brewery => "brewery",
            Category::Winery => "winery",
            Category::SugarShack => "sugar_shack",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::FarmStand => "farm-stand",
            Category::CheeseShop => "cheese-shop",
            Category::FishMonger => "fish-monger",
            Category::Butcher => "butcher",
            Category::AntiqueShop => "antique-shop",
            Category::Brewery => "brewery",
            Category::Winery => "winery",
            Category::SugarShack => "sugar-shack",
        }
    }

    /// Reverse slug lookup. Unknown slugs give `None`; nothing is guessed.
    pub fn from_slug(slug: &str) -> Option<Category> {
        SLUG_TO_CATEGORY.get(slug).copied()
    }

    pub fn display(self) -> &'static CategoryDisplay {
        match self {
            Category::FarmStand => &CategoryDisplay {
                singular: "Farm Stand",
                plural: "Farm Stands",
                emoji: "🚜",
                colors: ColorTokens {
                    badge: "bg-green-100 text-green-800",
                    marker: "#2f855a",
                    glow: "rgba(47, 133, 90, 0.45)",
                },
            },
            Category::CheeseShop => &CategoryDisplay {
                singular: "Cheesemonger",
                plural: "Cheesemongers",
                emoji: "🧀",
                colors: ColorTokens {
                    badge: "bg-yellow-100 text-yellow-800",
                    marker: "#d69e2e",
                    glow: "rgba(214, 158, 46, 0.45)",
                },
            },
            Category::FishMonger => &CategoryDisplay {
                singular: "Fishmonger",
                plural: "Fishmongers",
                emoji: "🐟",
                colors: ColorTokens {
                    badge: "bg-blue-100 text-blue-800",
                    marker: "#2b6cb0",
                    glow: "rgba(43, 108, 176, 0.45)",
                },
            },
            Category::Butcher => &CategoryDisplay {
                singular: "Butcher",
                plural: "Butchers",
                emoji: "🥩",
                colors: ColorTokens {
                    badge: "bg-red-100 text-red-800",
                    marker: "#c53030",
                    glow: "rgba(197, 48, 48, 0.45)",
                },
            },
            Category::AntiqueShop => &CategoryDisplay {
                singular: "Antiques",
                plural: "Antiques",
                emoji: "🏺",
                colors: ColorTokens {
                    badge: "bg-amber-100 text-amber-900",
                    marker: "#975a16",
                    glow: "rgba(151, 90, 22, 0.45)",
                },
            },
            Category::Brewery => &CategoryDisplay {
                singular: "Brewery",
                plural: "Breweries",
                emoji: "🍺",
                colors: ColorTokens {
                    badge: "bg-orange-100 text-orange-800",
                    marker: "#dd6b20",
                    glow: "rgba(221, 107, 32, 0.45)",
                },
            },
            Category::Winery => &CategoryDisplay {
                singular: "Winery",
                plural: "Wineries",
                emoji: "🍷",
                colors: ColorTokens {
                    badge: "bg-purple-100 text-purple-800",
                    marker: "#6b46c1",
                    glow: "rgba(107, 70, 193, 0.45)",
                },
            },
            Category::SugarShack => &CategoryDisplay {
                singular: "Sugar Shack",
                plural: "Sugar Shacks",
                emoji: "🍁",
                colors: ColorTokens {
                    badge: "bg-rose-100 text-rose-800",
                    marker: "#b7791f",
                    glow: "rgba(183, 121, 31, 0.45)",
                },
            },
        }
    }

    pub fn display_name(self, plural: bool) -> &'static str {
        let display = self.display();
        if plural {
            display.plural
        } else {
            display.singular
        }
    }

    pub fn emoji(self) -> &'static str {
        self.display().emoji
    }

    /// Base path of detail pages, which use singular forms (`/cheesemonger/:slug`)
    /// unlike category pages (`/cheese-shop`).
    pub fn detail_base_path(self) -> &'static str {
        match self {
            Category::FarmStand => "/farm-stand",
            Category::CheeseShop => "/cheesemonger",
            Category::FishMonger => "/fishmonger",
            Category::Butcher => "/butcher",
            Category::AntiqueShop => "/antique-shop",
            Category::Brewery => "/brewery",
            Category::Winery => "/winery",
            Category::SugarShack => "/sugar-shack",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ALL_CATEGORIES
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or(Error::UnknownCategory(s.to_string()))
    }
}

/// The categories a deployment shows. The first five are always on,
/// the rest are behind feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledCategories(BTreeSet<Category>);

impl EnabledCategories {
    pub fn all() -> Self {
        Self(Category::all())
    }

    pub fn with_flags(breweries: bool, wineries: bool, sugar_shacks: bool) -> Self {
        let mut enabled: BTreeSet<Category> = [
            Category::FarmStand,
            Category::CheeseShop,
            Category::FishMonger,
            Category::Butcher,
            Category::AntiqueShop,
        ]
        .into_iter()
        .collect();
        for (category, on) in [
            (Category::Brewery, breweries),
            (Category::Winery, wineries),
            (Category::SugarShack, sugar_shacks),
        ] {
            if on {
                enabled.insert(category);
            }
        }
        Self(enabled)
    }

    /// Build from flag values looked up by name (`ENABLE_BREWERIES`, `ENABLE_WINERIES`,
    /// `ENABLE_SUGAR_SHACKS`). A flag is on unless its value is exactly `false`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).as_deref() != Some("false");
        Self::with_flags(
            flag("ENABLE_BREWERIES"),
            flag("ENABLE_WINERIES"),
            flag("ENABLE_SUGAR_SHACKS"),
        )
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Intersect a selection with the enabled set.
    pub fn restrict(&self, selection: &BTreeSet<Category>) -> BTreeSet<Category> {
        selection.intersection(&self.0).copied().collect()
    }
}

impl Default for EnabledCategories {
    fn default() -> Self {
        Self::all()
    }
}
