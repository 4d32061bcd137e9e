use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::types::amenity::Amenity;
use crate::types::property_type::PropertyType;

pub type Amenities = BTreeMap<Amenity, bool>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: Address,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: Amenities,
    pub images: Vec<ListingImage>,
    pub contact_info: ContactInfo,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, max = 100), custom(function = "non_blank"))]
    pub city: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub street: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub agent_id: String,
}

/// Contact details accepted from agents. The owning agent always comes from the
/// caller's identity, so it is not part of the payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    #[validate(length(min = 1, max = 200), custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(nested)]
    pub address: Address,
    pub property_type: PropertyType,
    #[validate(range(max = 100))]
    #[serde(default)]
    pub bedrooms: u32,
    #[validate(range(max = 100))]
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: Amenities,
    #[validate(custom(function = "single_primary_image"))]
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[validate(nested)]
    #[serde(default)]
    pub contact_info: ContactInput,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

/// Partial update. Absent fields keep their stored value; present collections
/// replace the stored collection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[validate(length(min = 1, max = 200), custom(function = "non_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(nested)]
    pub address: Option<Address>,
    pub property_type: Option<PropertyType>,
    #[validate(range(max = 100))]
    pub bedrooms: Option<u32>,
    #[validate(range(max = 100))]
    pub bathrooms: Option<u32>,
    pub amenities: Option<Amenities>,
    #[validate(custom(function = "single_primary_image"))]
    pub images: Option<Vec<ListingImage>>,
    #[validate(nested)]
    pub contact_info: Option<ContactInput>,
    pub is_available: Option<bool>,
}

impl NewListing {
    pub fn into_listing(self, agent_id: &str, now: DateTime<Utc>) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description,
            price: self.price,
            address: self.address,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            amenities: self.amenities,
            images: self.images,
            contact_info: ContactInfo {
                phone: self.contact_info.phone,
                email: self.contact_info.email,
                agent_id: agent_id.to_string(),
            },
            is_available: self.is_available,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Listing {
    pub fn is_owned_by(&self, agent_id: &str) -> bool {
        self.contact_info.agent_id == agent_id
    }

    pub fn has_amenity(&self, amenity: Amenity) -> bool {
        self.amenities.get(&amenity).copied().unwrap_or(false)
    }

    /// Applies a validated patch. Identity, owner and creation time never change.
    pub fn apply_patch(&mut self, patch: ListingPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(property_type) = patch.property_type {
            self.property_type = property_type;
        }
        if let Some(bedrooms) = patch.bedrooms {
            self.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = patch.bathrooms {
            self.bathrooms = bathrooms;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = amenities;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(contact) = patch.contact_info {
            self.contact_info.phone = contact.phone;
            self.contact_info.email = contact.email;
        }
        if let Some(is_available) = patch.is_available {
            self.is_available = is_available;
        }
        self.updated_at = now;
    }
}

fn default_available() -> bool {
    true
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn single_primary_image(images: &[ListingImage]) -> Result<(), ValidationError> {
    if images.iter().filter(|image| image.is_primary).count() > 1 {
        return Err(ValidationError::new("multiple_primary_images"));
    }
    if images.iter().any(|image| image.url.trim().is_empty()) {
        return Err(ValidationError::new("empty_image_url"));
    }
    Ok(())
}
