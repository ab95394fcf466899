mod error;
mod path;
mod query;
mod route;
mod sync;

pub use crate::error::{Error, Result};
pub use crate::path::*;
pub use crate::query::*;
pub use crate::route::*;
pub use crate::sync::*;
