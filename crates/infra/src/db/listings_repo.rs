use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keja_core::domain::listing::{Address, Amenities, ContactInfo, Coordinates, Listing, ListingImage};
use keja_core::domain::search::{ListingFilter, ListingQuery, ListingSort};
use keja_core::types::property_type::PropertyType;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::DbPool;
use crate::store::{ListingStore, StoreError};

const LISTING_COLUMNS: &str = r#"
    id,
    title,
    description,
    price,
    city,
    street,
    latitude,
    longitude,
    property_type,
    bedrooms,
    bathrooms,
    amenities,
    images,
    contact_phone,
    contact_email,
    agent_id,
    is_available,
    created_at,
    updated_at
"#;

#[derive(Debug, Clone)]
pub struct PgListingStore {
    pool: DbPool,
}

impl PgListingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_page(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {LISTING_COLUMNS} FROM listings"));
        push_filter(&mut builder, &query.filter);
        push_sort(&mut builder, query.sort);
        builder
            .push(" LIMIT ")
            .push_bind(to_i64(query.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(query.skip));
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(map_listing).collect()
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM listings");
        push_filter(&mut builder, filter);
        let row = builder.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_all(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
    ) -> Result<Vec<Listing>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {LISTING_COLUMNS} FROM listings"));
        push_filter(&mut builder, filter);
        push_sort(&mut builder, sort);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(map_listing).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_listing).transpose()
    }

    async fn insert(&self, listing: &Listing) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO listings (
                id,
                title,
                description,
                price,
                city,
                street,
                latitude,
                longitude,
                property_type,
                bedrooms,
                bathrooms,
                amenities,
                images,
                contact_phone,
                contact_email,
                agent_id,
                is_available,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.address.city)
        .bind(listing.address.street.as_deref())
        .bind(listing.address.coordinates.map(|point| point.lat))
        .bind(listing.address.coordinates.map(|point| point.lng))
        .bind(listing.property_type.as_str())
        .bind(to_i32(listing.bedrooms))
        .bind(to_i32(listing.bathrooms))
        .bind(Json(&listing.amenities))
        .bind(Json(&listing.images))
        .bind(listing.contact_info.phone.as_deref())
        .bind(listing.contact_info.email.as_deref())
        .bind(&listing.contact_info.agent_id)
        .bind(listing.is_available)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace(&self, listing: &Listing) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE listings SET
                title = $2,
                description = $3,
                price = $4,
                city = $5,
                street = $6,
                latitude = $7,
                longitude = $8,
                property_type = $9,
                bedrooms = $10,
                bathrooms = $11,
                amenities = $12,
                images = $13,
                contact_phone = $14,
                contact_email = $15,
                is_available = $16,
                updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.address.city)
        .bind(listing.address.street.as_deref())
        .bind(listing.address.coordinates.map(|point| point.lat))
        .bind(listing.address.coordinates.map(|point| point.lng))
        .bind(listing.property_type.as_str())
        .bind(to_i32(listing.bedrooms))
        .bind(to_i32(listing.bathrooms))
        .bind(Json(&listing.amenities))
        .bind(Json(&listing.images))
        .bind(listing.contact_info.phone.as_deref())
        .bind(listing.contact_info.email.as_deref())
        .bind(listing.is_available)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    builder.push(" WHERE TRUE");
    if filter.available_only {
        builder.push(" AND is_available = TRUE");
    }
    if let Some(city) = filter.city_contains.as_deref() {
        builder.push(" AND city ILIKE ").push_bind(contains_pattern(city));
    }
    if let Some(min) = filter.price.min {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.price.max {
        builder.push(" AND price <= ").push_bind(max);
    }
    if let Some(min) = filter.min_bedrooms {
        builder.push(" AND bedrooms >= ").push_bind(i64::from(min));
    }
    if let Some(min) = filter.min_bathrooms {
        builder.push(" AND bathrooms >= ").push_bind(i64::from(min));
    }
    if let Some(kind) = filter.property_type {
        builder.push(" AND property_type = ").push_bind(kind.as_str());
    }
    if !filter.amenities.is_empty() {
        builder
            .push(" AND amenities @> ")
            .push_bind(Json(required_amenities(filter)));
    }
}

fn push_sort(builder: &mut QueryBuilder<'_, Postgres>, sort: ListingSort) {
    match sort {
        ListingSort::NewestFirst => builder.push(" ORDER BY created_at DESC, id DESC"),
    };
}

/// ILIKE pattern matching `needle` literally anywhere in the column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn required_amenities(filter: &ListingFilter) -> Value {
    let mut object = Map::new();
    for amenity in &filter.amenities {
        object.insert(amenity.as_str().to_string(), Value::Bool(true));
    }
    Value::Object(object)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_u32(column: &'static str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::InvalidRow(format!("{column} is negative")))
}

fn map_listing(row: PgRow) -> Result<Listing, StoreError> {
    let property_type: String = row.try_get("property_type")?;
    let property_type = PropertyType::try_from(property_type.as_str())
        .map_err(|err| StoreError::InvalidRow(err.to_string()))?;
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let coordinates = match (latitude, longitude) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };
    let Json(amenities): Json<Amenities> = row.try_get("amenities")?;
    let Json(images): Json<Vec<ListingImage>> = row.try_get("images")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(Listing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        address: Address {
            city: row.try_get("city")?,
            street: row.try_get("street")?,
            coordinates,
        },
        property_type,
        bedrooms: to_u32("bedrooms", row.try_get("bedrooms")?)?,
        bathrooms: to_u32("bathrooms", row.try_get("bathrooms")?)?,
        amenities,
        images,
        contact_info: ContactInfo {
            phone: row.try_get("contact_phone")?,
            email: row.try_get("contact_email")?,
            agent_id: row.try_get("agent_id")?,
        },
        is_available: row.try_get("is_available")?,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use keja_core::domain::search::SearchCriteria;
    use keja_core::types::amenity::Amenity;
    use keja_core::types::price_range::PriceRange;
    use sqlx::{Execute, Postgres, QueryBuilder};

    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("juja"), "%juja%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn empty_criteria_only_filters_availability() {
        let filter = SearchCriteria::default().filter();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM listings");
        push_filter(&mut builder, &filter);
        let sql = builder.build().sql().to_string();
        assert_eq!(sql, "SELECT 1 FROM listings WHERE TRUE AND is_available = TRUE");
    }

    #[test]
    fn full_criteria_binds_every_constraint() {
        let criteria = SearchCriteria {
            city: Some("juja".to_string()),
            price: PriceRange::new(Some(3000.0), Some(9000.0)),
            bedrooms: Some(2),
            bathrooms: Some(1),
            property_type: Some(PropertyType::House),
            amenities: vec![Amenity::Wifi],
            ..SearchCriteria::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM listings");
        push_filter(&mut builder, &criteria.filter());
        push_sort(&mut builder, ListingSort::NewestFirst);
        let sql = builder.build().sql().to_string();
        assert!(sql.contains("city ILIKE $1"));
        assert!(sql.contains("price >= $2"));
        assert!(sql.contains("price <= $3"));
        assert!(sql.contains("bedrooms >= $4"));
        assert!(sql.contains("bathrooms >= $5"));
        assert!(sql.contains("property_type = $6"));
        assert!(sql.contains("amenities @> $7"));
        assert!(sql.ends_with("ORDER BY created_at DESC, id DESC"));
    }

    #[test]
    fn required_amenities_is_a_true_map() {
        let filter = SearchCriteria {
            amenities: vec![Amenity::Water, Amenity::Parking],
            ..SearchCriteria::default()
        }
        .filter();
        let value = required_amenities(&filter);
        assert_eq!(value, serde_json::json!({ "water": true, "parking": true }));
    }
}
