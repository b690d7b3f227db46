//! Area repository and read-through cache.
//!
//! Area data is effectively static, so lookups are cached in-process with a
//! one-hour time-to-live.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use pavilion_core::AreaId;

use super::RepositoryError;
use crate::models::area::Area;

/// How long cached area listings stay fresh.
const AREA_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Upper bound on distinct cached listings (provinces + one entry per parent).
const AREA_CACHE_CAPACITY: u64 = 1024;

/// Repository for area database operations.
pub struct AreaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AreaRepository<'a> {
    /// Create a new area repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all provinces (areas without a parent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn provinces(&self) -> Result<Vec<Area>, RepositoryError> {
        let areas = sqlx::query_as::<_, Area>(
            "SELECT id, name, parent_id FROM areas WHERE parent_id IS NULL ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(areas)
    }

    /// Get a single area by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AreaId) -> Result<Option<Area>, RepositoryError> {
        let area =
            sqlx::query_as::<_, Area>("SELECT id, name, parent_id FROM areas WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(area)
    }

    /// List the direct children of an area.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn children(&self, parent_id: AreaId) -> Result<Vec<Area>, RepositoryError> {
        let areas = sqlx::query_as::<_, Area>(
            "SELECT id, name, parent_id FROM areas WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id)
        .fetch_all(self.pool)
        .await?;

        Ok(areas)
    }
}

/// Cache key for area listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum AreaCacheKey {
    Provinces,
    Children(AreaId),
}

/// Cached area listing variants.
#[derive(Debug, Clone)]
pub enum AreaListing {
    /// All provinces.
    Provinces(Vec<Area>),
    /// A parent area and its direct children.
    Children { parent: Area, subs: Vec<Area> },
}

/// Read-through cache over [`AreaRepository`] lookups.
#[derive(Clone)]
pub struct AreaCache {
    entries: Cache<AreaCacheKey, Arc<AreaListing>>,
}

impl AreaCache {
    /// Create an empty cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(AREA_CACHE_TTL)
                .max_capacity(AREA_CACHE_CAPACITY)
                .build(),
        }
    }

    /// Fetch the province listing, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the underlying query fails.
    pub async fn provinces(
        &self,
        repo: &AreaRepository<'_>,
    ) -> Result<Arc<AreaListing>, RepositoryError> {
        if let Some(listing) = self.entries.get(&AreaCacheKey::Provinces).await {
            return Ok(listing);
        }

        let listing = Arc::new(AreaListing::Provinces(repo.provinces().await?));
        self.entries
            .insert(AreaCacheKey::Provinces, Arc::clone(&listing))
            .await;

        Ok(listing)
    }

    /// Fetch an area and its children, consulting the cache first.
    ///
    /// Returns `None` when no area has the given ID. Missing areas are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an underlying query fails.
    pub async fn children(
        &self,
        repo: &AreaRepository<'_>,
        id: AreaId,
    ) -> Result<Option<Arc<AreaListing>>, RepositoryError> {
        let key = AreaCacheKey::Children(id);
        if let Some(listing) = self.entries.get(&key).await {
            return Ok(Some(listing));
        }

        let Some(parent) = repo.get(id).await? else {
            return Ok(None);
        };
        let subs = repo.children(id).await?;

        let listing = Arc::new(AreaListing::Children { parent, subs });
        self.entries.insert(key, Arc::clone(&listing)).await;

        Ok(Some(listing))
    }
}

impl Default for AreaCache {
    fn default() -> Self {
        Self::new()
    }
}
