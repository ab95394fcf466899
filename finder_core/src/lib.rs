pub mod category;
pub mod error;
pub mod filter;
pub mod listing;
pub mod product;

pub use category::{Category, EnabledCategories, ALL_CATEGORIES};
pub use error::*;
pub use filter::{FilterState, LatLng, SearchLocation};
