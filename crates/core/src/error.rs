use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("invalid amenity: {0}")]
    InvalidAmenity(String),
}
