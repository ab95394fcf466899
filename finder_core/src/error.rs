use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Attribute `{0}` is not offered by any selected category")]
    InvalidAttribute(String),
    #[error("Coordinates out of range: ({0}, {1})")]
    InvalidCoordinates(f64, f64),
}
