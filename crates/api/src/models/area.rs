//! Area domain types.

use pavilion_core::AreaId;

/// A node in the province/city/district tree.
///
/// Provinces have no parent; cities point at a province, districts at a city.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub parent_id: Option<AreaId>,
}
