use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Townhouse,
    Studio,
    Bedsitter,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Studio,
        PropertyType::Bedsitter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Studio => "studio",
            PropertyType::Bedsitter => "bedsitter",
        }
    }
}

impl TryFrom<&str> for PropertyType {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        PropertyType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| CoreError::InvalidPropertyType(trimmed.to_string()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyType;

    #[test]
    fn parse_known_types() {
        assert_eq!(PropertyType::try_from("bedsitter").unwrap(), PropertyType::Bedsitter);
        assert_eq!(PropertyType::try_from(" condo ").unwrap(), PropertyType::Condo);
    }

    #[test]
    fn parse_is_exact_match() {
        assert!(PropertyType::try_from("Apartment").is_err());
        assert!(PropertyType::try_from("villa").is_err());
        assert!(PropertyType::try_from("").is_err());
    }
}
