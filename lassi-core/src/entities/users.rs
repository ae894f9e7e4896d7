use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use lassi_sdk::objects::{ProfileResponse, UserSummary};
use uuid::Uuid;

/// A row of `website_users`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: String,
    pub dob: Option<time::Date>,
    pub address: Option<String>,
    pub created_at: time::OffsetDateTime,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// The user as returned by the profile endpoints, without credentials.
    pub fn profile(&self) -> ProfileResponse {
        ProfileResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            dob: self.dob,
            address: self.address.clone(),
        }
    }
}

/// Normalize an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, mobile, dob, address, created_at";

#[derive(Debug, Clone, Copy)]
pub struct GetUserById {
    pub id: Uuid,
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM website_users WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Look up a user by normalized email.
#[derive(Debug, Clone)]
pub struct GetUserByEmail {
    pub email: String,
}

impl Processor<GetUserByEmail> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByEmail")]
    async fn process(&self, query: GetUserByEmail) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM website_users WHERE email = $1"
        ))
        .bind(query.email)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Create a user.
///
/// Returns `None` when the email is already registered.
#[derive(Debug, Clone)]
pub struct InsertUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: String,
}

impl Processor<InsertUser> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertUser")]
    async fn process(&self, insert: InsertUser) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO website_users (id, name, email, password_hash, mobile) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(insert.name)
        .bind(insert.email)
        .bind(insert.password_hash)
        .bind(insert.mobile)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Update profile fields. `None` for `name` or `mobile` keeps the stored
/// value; `dob` and `address` are always overwritten.
#[derive(Debug, Clone)]
pub struct UpdateUserProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<time::Date>,
    pub address: Option<String>,
}

impl Processor<UpdateUserProfile> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateUserProfile")]
    async fn process(&self, update: UpdateUserProfile) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE website_users SET \
                name = COALESCE($2, name), \
                mobile = COALESCE($3, mobile), \
                dob = $4, \
                address = $5, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(update.id)
        .bind(update.name)
        .bind(update.mobile)
        .bind(update.dob)
        .bind(update.address)
        .fetch_optional(&self.pool)
        .await
    }
}
