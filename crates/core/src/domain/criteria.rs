use serde::Deserialize;
use thiserror::Error;

use crate::domain::search::{SearchCriteria, DEFAULT_PAGE_LIMIT};
use crate::types::amenity::Amenity;
use crate::types::price_range::PriceRange;
use crate::types::property_type::PropertyType;

const MAX_CITY_LEN: usize = 100;

/// Raw query-string values as received. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCriteria {
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub property_type: Option<String>,
    pub amenities: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: 50,
        }
    }
}

#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("{0} must be a number, got {1:?}")]
    InvalidNumber(&'static str, String),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} must be a positive integer, got {1:?}")]
    InvalidPositive(&'static str, String),
    #[error("unknown property type: {0}")]
    InvalidPropertyType(String),
    #[error("unknown amenity: {0}")]
    InvalidAmenity(String),
    #[error("city filter too long (max {0} chars)")]
    CityTooLong(usize),
}

/// Turns raw parameters into criteria. Malformed numbers are rejected rather than
/// treated as absent, so a typo never silently widens or empties a search.
pub fn parse_criteria(raw: RawCriteria, limits: PageLimits) -> Result<SearchCriteria, CriteriaError> {
    let city = non_blank(raw.city);
    if let Some(city) = city.as_deref() {
        if city.chars().count() > MAX_CITY_LEN {
            return Err(CriteriaError::CityTooLong(MAX_CITY_LEN));
        }
    }
    let min_price = parse_price("minPrice", raw.min_price)?;
    let max_price = parse_price("maxPrice", raw.max_price)?;
    let bedrooms = parse_count("bedrooms", raw.bedrooms)?;
    let bathrooms = parse_count("bathrooms", raw.bathrooms)?;
    let property_type = non_blank(raw.property_type)
        .map(|value| {
            PropertyType::try_from(value.as_str())
                .map_err(|_| CriteriaError::InvalidPropertyType(value))
        })
        .transpose()?;
    let amenities = parse_amenities(raw.amenities)?;
    let page = parse_positive("page", raw.page)?.unwrap_or(1);
    let limit = parse_positive("limit", raw.limit)?
        .unwrap_or(limits.default_limit)
        .min(limits.max_limit.max(1));

    Ok(SearchCriteria {
        city,
        price: PriceRange::new(min_price, max_price),
        bedrooms,
        bathrooms,
        property_type,
        amenities,
        page,
        limit,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_price(field: &'static str, value: Option<String>) -> Result<Option<f64>, CriteriaError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    let parsed: f64 = value
        .parse()
        .map_err(|_| CriteriaError::InvalidNumber(field, value.clone()))?;
    if !parsed.is_finite() {
        return Err(CriteriaError::InvalidNumber(field, value));
    }
    if parsed < 0.0 {
        return Err(CriteriaError::Negative(field));
    }
    Ok(Some(parsed))
}

fn parse_count(field: &'static str, value: Option<String>) -> Result<Option<u32>, CriteriaError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    if value.starts_with('-') {
        return Err(CriteriaError::Negative(field));
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| CriteriaError::InvalidNumber(field, value))
}

fn parse_positive(field: &'static str, value: Option<String>) -> Result<Option<u32>, CriteriaError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
        _ => Err(CriteriaError::InvalidPositive(field, value)),
    }
}

fn parse_amenities(value: Option<String>) -> Result<Vec<Amenity>, CriteriaError> {
    let Some(value) = non_blank(value) else {
        return Ok(Vec::new());
    };
    let mut amenities = Vec::new();
    for item in value.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let amenity =
            Amenity::try_from(item).map_err(|_| CriteriaError::InvalidAmenity(item.to_string()))?;
        if !amenities.contains(&amenity) {
            amenities.push(amenity);
        }
    }
    Ok(amenities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawCriteria {
        RawCriteria::default()
    }

    #[test]
    fn empty_input_uses_defaults() {
        let criteria = parse_criteria(raw(), PageLimits::default()).unwrap();
        assert_eq!(criteria, SearchCriteria::default());
    }

    #[test]
    fn blank_fields_are_absent() {
        let input = RawCriteria {
            city: Some("  ".to_string()),
            min_price: Some("".to_string()),
            property_type: Some(" ".to_string()),
            ..raw()
        };
        let criteria = parse_criteria(input, PageLimits::default()).unwrap();
        assert!(criteria.city.is_none());
        assert!(criteria.price.is_unbounded());
        assert!(criteria.property_type.is_none());
    }

    #[test]
    fn parses_full_set() {
        let input = RawCriteria {
            city: Some(" Juja ".to_string()),
            min_price: Some("3000".to_string()),
            max_price: Some("7500.5".to_string()),
            bedrooms: Some("2".to_string()),
            bathrooms: Some("1".to_string()),
            property_type: Some("bedsitter".to_string()),
            amenities: Some("water, wifi,water".to_string()),
            page: Some("2".to_string()),
            limit: Some("6".to_string()),
        };
        let criteria = parse_criteria(input, PageLimits::default()).unwrap();
        assert_eq!(criteria.city.as_deref(), Some("Juja"));
        assert_eq!(criteria.price, PriceRange::new(Some(3000.0), Some(7500.5)));
        assert_eq!(criteria.bedrooms, Some(2));
        assert_eq!(criteria.bathrooms, Some(1));
        assert_eq!(criteria.property_type, Some(PropertyType::Bedsitter));
        assert_eq!(criteria.amenities, vec![Amenity::Water, Amenity::Wifi]);
        assert_eq!((criteria.page, criteria.limit), (2, 6));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let input = RawCriteria {
            min_price: Some("cheap".to_string()),
            ..raw()
        };
        let err = parse_criteria(input, PageLimits::default()).unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidNumber("minPrice", _)));
    }

    #[test]
    fn nan_and_negative_prices_are_rejected() {
        let input = RawCriteria {
            max_price: Some("NaN".to_string()),
            ..raw()
        };
        assert!(parse_criteria(input, PageLimits::default()).is_err());
        let input = RawCriteria {
            min_price: Some("-1".to_string()),
            ..raw()
        };
        let err = parse_criteria(input, PageLimits::default()).unwrap_err();
        assert!(matches!(err, CriteriaError::Negative("minPrice")));
    }

    #[test]
    fn inverted_price_range_is_not_an_error() {
        let input = RawCriteria {
            min_price: Some("5000".to_string()),
            max_price: Some("3000".to_string()),
            ..raw()
        };
        let criteria = parse_criteria(input, PageLimits::default()).unwrap();
        assert!(criteria.price.is_inverted());
    }

    #[test]
    fn page_and_limit_must_be_positive() {
        for (page, limit) in [("0", "6"), ("1", "0"), ("x", "6"), ("1", "-3")] {
            let input = RawCriteria {
                page: Some(page.to_string()),
                limit: Some(limit.to_string()),
                ..raw()
            };
            let err = parse_criteria(input, PageLimits::default()).unwrap_err();
            assert!(matches!(err, CriteriaError::InvalidPositive(_, _)));
        }
    }

    #[test]
    fn limit_is_clamped_to_maximum() {
        let input = RawCriteria {
            limit: Some("500".to_string()),
            ..raw()
        };
        let limits = PageLimits {
            default_limit: 20,
            max_limit: 50,
        };
        assert_eq!(parse_criteria(input, limits).unwrap().limit, 50);
    }

    #[test]
    fn unknown_property_type_and_amenity_are_rejected() {
        let input = RawCriteria {
            property_type: Some("castle".to_string()),
            ..raw()
        };
        assert!(matches!(
            parse_criteria(input, PageLimits::default()).unwrap_err(),
            CriteriaError::InvalidPropertyType(_)
        ));
        let input = RawCriteria {
            amenities: Some("water,pool".to_string()),
            ..raw()
        };
        assert!(matches!(
            parse_criteria(input, PageLimits::default()).unwrap_err(),
            CriteriaError::InvalidAmenity(_)
        ));
    }

    #[test]
    fn negative_bedrooms_are_rejected() {
        let input = RawCriteria {
            bedrooms: Some("-2".to_string()),
            ..raw()
        };
        let err = parse_criteria(input, PageLimits::default()).unwrap_err();
        assert!(matches!(err, CriteriaError::Negative("bedrooms")));
    }
}
