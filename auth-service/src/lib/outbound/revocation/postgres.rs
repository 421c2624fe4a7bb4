use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;
use sqlx::PgPool;

use crate::identity::errors::RevocationStoreError;
use crate::identity::ports::RevocationStore;

/// Revocation set kept in the `revoked_tokens` table.
///
/// Every write first purges rows that have outlived their token.
pub struct PostgresRevocationStore {
    pool: PgPool,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> RevocationStoreError {
    RevocationStoreError::Unavailable(e.to_string())
}

#[async_trait]
impl RevocationStore for PostgresRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationStoreError> {
        if ttl <= Duration::zero() {
            return Ok(());
        }

        let expires_at = Utc::now() + ttl;
        sqlx::query(
            r#"
            WITH purged AS (
                DELETE FROM revoked_tokens WHERE expires_at <= NOW()
            )
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti)
            DO UPDATE SET expires_at = GREATEST(revoked_tokens.expires_at, EXCLUDED.expires_at)
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationStoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1 AND expires_at > NOW())",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)
    }
}
