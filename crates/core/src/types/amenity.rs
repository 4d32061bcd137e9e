use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Amenity names a listing may flag. Serialized as map keys in listing payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Water,
    Electricity,
    Wifi,
    Security,
    Parking,
    Kitchen,
    Balcony,
    Furnished,
}

impl Amenity {
    pub const ALL: [Amenity; 8] = [
        Amenity::Water,
        Amenity::Electricity,
        Amenity::Wifi,
        Amenity::Security,
        Amenity::Parking,
        Amenity::Kitchen,
        Amenity::Balcony,
        Amenity::Furnished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Amenity::Water => "water",
            Amenity::Electricity => "electricity",
            Amenity::Wifi => "wifi",
            Amenity::Security => "security",
            Amenity::Parking => "parking",
            Amenity::Kitchen => "kitchen",
            Amenity::Balcony => "balcony",
            Amenity::Furnished => "furnished",
        }
    }
}

impl TryFrom<&str> for Amenity {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.as_str() == trimmed)
            .ok_or_else(|| CoreError::InvalidAmenity(trimmed.to_string()))
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
