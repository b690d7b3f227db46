//! Address domain types.

use serde::Serialize;

use pavilion_core::{AddressId, AreaId, Mobile};

/// A validated address ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAddress {
    /// Short label; defaults to the receiver name.
    pub title: String,
    pub receiver: String,
    pub province_id: AreaId,
    pub city_id: AreaId,
    pub district_id: AreaId,
    /// Street-level detail within the district.
    pub place: String,
    pub mobile: Mobile,
    pub tel: Option<String>,
    pub email: Option<String>,
}

/// A stored address projected for API responses, with area names resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AddressDetail {
    pub id: AddressId,
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: String,
    pub tel: Option<String>,
    pub email: Option<String>,
}
