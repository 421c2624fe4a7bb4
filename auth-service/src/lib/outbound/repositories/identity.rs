use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::errors::RepositoryError;
use crate::identity::errors::UniqueField;
use crate::identity::models::AccountStatus;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::IdentityUuid;
use crate::identity::models::Metadata;
use crate::identity::models::NewIdentity;
use crate::identity::models::Role;
use crate::identity::models::Username;
use crate::identity::ports::IdentityRepository;

const IDENTITY_COLUMNS: &str = "id, uuid, username, email, password_hash, avatar, bio, role, \
     status, last_login_at, created_at, updated_at, deleted_at";

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    uuid: Uuid,
    username: String,
    email: String,
    password_hash: String,
    avatar: Option<String>,
    bio: Option<String>,
    role: String,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: IdentityId(row.id),
            uuid: IdentityUuid(row.uuid),
            username: Username::new(row.username).map_err(invalid)?,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            bio: row.bio,
            role: row.role.parse::<Role>().map_err(invalid)?,
            status: row.status.parse::<AccountStatus>().map_err(invalid)?,
            last_login_at: row.last_login_at,
            metadata: Metadata {
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: row.deleted_at,
            },
        })
    }
}

fn invalid(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidData(e.to_string())
}

fn unavailable(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Unavailable(e.to_string())
}

/// Map a failed write, recognising unique violations by constraint name.
fn write_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("identities_email_key") => {
                    return RepositoryError::Duplicate(UniqueField::Email)
                }
                Some("identities_username_key") => {
                    return RepositoryError::Duplicate(UniqueField::Username)
                }
                Some("identities_uuid_key") => {
                    return RepositoryError::Duplicate(UniqueField::Uuid)
                }
                _ => {}
            }
        }
    }
    unavailable(e)
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM identities WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE username = $1)",
        )
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_uuid(
        &self,
        uuid: &IdentityUuid,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE uuid = $1 AND deleted_at IS NULL"
        ))
        .bind(uuid.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(Identity::try_from).transpose()
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            INSERT INTO identities (uuid, username, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(identity.uuid.0)
        .bind(identity.username.as_str())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(identity.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Identity::try_from(row)
    }

    async fn update(&self, identity: Identity) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identities
            SET username = $2, email = $3, password_hash = $4, avatar = $5, bio = $6,
                role = $7, status = $8, last_login_at = $9, updated_at = $10
            WHERE uuid = $1 AND deleted_at IS NULL
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(identity.uuid.0)
        .bind(identity.username.as_str())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.avatar)
        .bind(&identity.bio)
        .bind(identity.role.as_str())
        .bind(identity.status.as_str())
        .bind(identity.last_login_at)
        .bind(identity.metadata.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        row.ok_or(RepositoryError::NotFound)
            .and_then(Identity::try_from)
    }
}
