pub mod amenity;
pub mod price_range;
pub mod property_type;
