use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::listing::Listing;
use crate::types::amenity::Amenity;
use crate::types::price_range::PriceRange;
use crate::types::property_type::PropertyType;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Loose search input. Every filter is optional; an absent filter imposes no
/// constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub city: Option<String>,
    pub price: PriceRange,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub amenities: Vec<Amenity>,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            city: None,
            price: PriceRange::default(),
            bedrooms: None,
            bathrooms: None,
            property_type: None,
            amenities: Vec::new(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl SearchCriteria {
    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            available_only: true,
            city_contains: self.city.clone(),
            price: self.price,
            min_bedrooms: self.bedrooms,
            min_bathrooms: self.bathrooms,
            property_type: self.property_type,
            amenities: self.amenities.clone(),
        }
    }

    pub fn query(&self) -> ListingQuery {
        let limit = u64::from(self.limit.max(1));
        let skip = u64::from(self.page.max(1) - 1).saturating_mul(limit);
        ListingQuery {
            filter: self.filter(),
            sort: ListingSort::NewestFirst,
            skip,
            limit,
        }
    }

    /// Same filters, different page. Used by the client to walk a session.
    pub fn with_page(&self, page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..self.clone()
        }
    }

    /// Two criteria describe the same session when every filter matches; paging
    /// fields are ignored.
    pub fn same_filters(&self, other: &SearchCriteria) -> bool {
        self.filter() == other.filter()
    }

    /// Query-string pairs understood by `GET /listings`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(city) = self.city.as_deref() {
            pairs.push(("city", city.to_string()));
        }
        if let Some(min) = self.price.min {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.price.max {
            pairs.push(("maxPrice", max.to_string()));
        }
        if let Some(bedrooms) = self.bedrooms {
            pairs.push(("bedrooms", bedrooms.to_string()));
        }
        if let Some(bathrooms) = self.bathrooms {
            pairs.push(("bathrooms", bathrooms.to_string()));
        }
        if let Some(kind) = self.property_type {
            pairs.push(("propertyType", kind.as_str().to_string()));
        }
        if !self.amenities.is_empty() {
            let joined = self
                .amenities
                .iter()
                .map(|amenity| amenity.as_str())
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("amenities", joined));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Store-facing predicate. All present constraints are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub available_only: bool,
    pub city_contains: Option<String>,
    pub price: PriceRange,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub amenities: Vec<Amenity>,
}

impl ListingFilter {
    pub fn for_city(city: &str) -> Self {
        Self {
            available_only: true,
            city_contains: Some(city.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if self.available_only && !listing.is_available {
            return false;
        }
        if let Some(city) = self.city_contains.as_deref() {
            let haystack = listing.address.city.to_lowercase();
            if !haystack.contains(&city.to_lowercase()) {
                return false;
            }
        }
        if !self.price.contains(listing.price) {
            return false;
        }
        if self.min_bedrooms.is_some_and(|min| listing.bedrooms < min) {
            return false;
        }
        if self.min_bathrooms.is_some_and(|min| listing.bathrooms < min) {
            return false;
        }
        if self
            .property_type
            .is_some_and(|kind| listing.property_type != kind)
        {
            return false;
        }
        self.amenities
            .iter()
            .all(|amenity| listing.has_amenity(*amenity))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingSort {
    /// Creation time descending, then id descending so ties page deterministically.
    #[default]
    NewestFirst,
}

impl ListingSort {
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            ListingSort::NewestFirst => b
                .created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    pub sort: ListingSort,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `total` is never below 1, even for zero matches.
    pub fn compute(page: u32, limit: u32, matching: u64) -> Self {
        let limit = u64::from(limit.max(1));
        let page = page.max(1);
        let pages = matching.div_ceil(limit).max(1);
        Self {
            current: page,
            total: u32::try_from(pages).unwrap_or(u32::MAX),
            has_next: u64::from(page).saturating_mul(limit) < matching,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::listing::{Address, ContactInfo};

    fn listing(city: &str, price: f64, bedrooms: u32, minutes: i64) -> Listing {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Listing {
            id: Uuid::new_v4(),
            title: format!("{city} unit"),
            description: String::new(),
            price,
            address: Address {
                city: city.to_string(),
                street: None,
                coordinates: None,
            },
            property_type: PropertyType::Apartment,
            bedrooms,
            bathrooms: 1,
            amenities: BTreeMap::new(),
            images: Vec::new(),
            contact_info: ContactInfo {
                phone: None,
                email: None,
                agent_id: "agent".to_string(),
            },
            is_available: true,
            created_at: base + Duration::minutes(minutes),
            updated_at: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn pagination_total_is_at_least_one() {
        let page = Pagination::compute(1, 6, 0);
        assert_eq!(page.total, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn pagination_matches_juja_walk() {
        let first = Pagination::compute(1, 6, 13);
        assert_eq!((first.current, first.total, first.has_next), (1, 3, true));
        let second = Pagination::compute(2, 6, 13);
        assert_eq!((second.total, second.has_next, second.has_prev), (3, true, true));
        let third = Pagination::compute(3, 6, 13);
        assert!(!third.has_next);
    }

    #[test]
    fn pagination_exact_multiple_has_no_next_on_last_page() {
        let last = Pagination::compute(2, 6, 12);
        assert_eq!(last.total, 2);
        assert!(!last.has_next);
    }

    #[test]
    fn query_computes_skip_from_page() {
        let criteria = SearchCriteria {
            page: 3,
            limit: 6,
            ..SearchCriteria::default()
        };
        let query = criteria.query();
        assert_eq!(query.skip, 12);
        assert_eq!(query.limit, 6);
        assert!(query.filter.available_only);
    }

    #[test]
    fn empty_filter_still_requires_availability() {
        let filter = SearchCriteria::default().filter();
        let mut delisted = listing("Juja", 5000.0, 1, 0);
        assert!(filter.matches(&delisted));
        delisted.is_available = false;
        assert!(!filter.matches(&delisted));
    }

    #[test]
    fn city_is_case_insensitive_substring() {
        let filter = ListingFilter::for_city("juja");
        assert!(filter.matches(&listing("Juja", 1.0, 0, 0)));
        assert!(filter.matches(&listing("JUJA Farm", 1.0, 0, 0)));
        assert!(!filter.matches(&listing("Thika", 1.0, 0, 0)));
    }

    #[test]
    fn bedrooms_is_a_minimum() {
        let filter = SearchCriteria {
            bedrooms: Some(2),
            ..SearchCriteria::default()
        }
        .filter();
        assert!(!filter.matches(&listing("Juja", 1.0, 1, 0)));
        assert!(filter.matches(&listing("Juja", 1.0, 2, 0)));
        assert!(filter.matches(&listing("Juja", 1.0, 4, 0)));
    }

    #[test]
    fn amenities_must_all_be_flagged() {
        let filter = SearchCriteria {
            amenities: vec![Amenity::Water, Amenity::Parking],
            ..SearchCriteria::default()
        }
        .filter();
        let mut unit = listing("Juja", 1.0, 1, 0);
        unit.amenities.insert(Amenity::Water, true);
        assert!(!filter.matches(&unit));
        unit.amenities.insert(Amenity::Parking, false);
        assert!(!filter.matches(&unit));
        unit.amenities.insert(Amenity::Parking, true);
        assert!(filter.matches(&unit));
    }

    #[test]
    fn newest_first_breaks_ties_by_id() {
        let older = listing("Juja", 1.0, 1, 0);
        let newer = listing("Juja", 1.0, 1, 5);
        assert_eq!(ListingSort::NewestFirst.compare(&newer, &older), Ordering::Less);

        let mut twin = older.clone();
        twin.id = Uuid::from_u128(u128::MAX);
        let mut other = older.clone();
        other.id = Uuid::from_u128(1);
        assert_eq!(ListingSort::NewestFirst.compare(&twin, &other), Ordering::Less);
    }

    #[test]
    fn same_filters_ignores_paging() {
        let criteria = SearchCriteria {
            city: Some("juja".to_string()),
            ..SearchCriteria::default()
        };
        assert!(criteria.same_filters(&criteria.with_page(4, 6)));
        let other = SearchCriteria {
            city: Some("thika".to_string()),
            ..SearchCriteria::default()
        };
        assert!(!criteria.same_filters(&other));
    }

    #[test]
    fn query_pairs_skip_absent_filters() {
        let criteria = SearchCriteria {
            city: Some("juja".to_string()),
            amenities: vec![Amenity::Wifi, Amenity::Water],
            limit: 6,
            ..SearchCriteria::default()
        };
        let pairs = criteria.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("city", "juja".to_string()),
                ("amenities", "wifi,water".to_string()),
                ("page", "1".to_string()),
                ("limit", "6".to_string()),
            ]
        );
    }
}
