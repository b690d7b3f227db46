//! Address repository for database operations.

use sqlx::PgPool;

use pavilion_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{AddressDetail, NewAddress};

/// Columns of the address projection returned to clients, with area names
/// resolved through joins.
const DETAIL_QUERY: &str = "SELECT a.id, a.title, a.receiver, \
            p.name AS province, c.name AS city, d.name AS district, \
            a.place, a.mobile, a.tel, a.email \
     FROM addresses a \
     JOIN areas p ON a.province_id = p.id \
     JOIN areas c ON a.city_id = c.id \
     JOIN areas d ON a.district_id = d.id \
     WHERE a.id = $1";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count a user's live (not soft-deleted) addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn live_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM addresses WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Insert a new address for a user and return its client projection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any referenced area does not
    /// exist. Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &NewAddress,
    ) -> Result<AddressDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: AddressId = sqlx::query_scalar(
            "INSERT INTO addresses \
                 (user_id, title, receiver, province_id, city_id, district_id, \
                  place, mobile, tel, email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(&address.title)
        .bind(&address.receiver)
        .bind(address.province_id)
        .bind(address.city_id)
        .bind(address.district_id)
        .bind(&address.place)
        .bind(&address.mobile)
        .bind(&address.tel)
        .bind(&address.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("referenced area does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let detail = sqlx::query_as::<_, AddressDetail>(DETAIL_QUERY)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(detail)
    }
}
