use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo::{validate_changes, validate_new_user, StoreError, UserStore};
use super::repo_types::{NewUser, ProfileChanges, User, UserRow, DEFAULT_COUNTRY};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, account_type, \
     phone, profile_picture, country, city, timezone, is_email_verified, is_active, \
     last_login_at, created_at, updated_at";

/// `users` table in Postgres. Email uniqueness comes from the `users_email_key` index.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(|e| StoreError::Backend(anyhow::anyhow!(e)))
}

/// Wire field for a unique violation. Constraints other than the email key
/// are not user input and surface as backend errors.
fn duplicate_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint {
        Some("users_email_key") | None => Some("email"),
        Some(_) => None,
    }
}

fn classify_insert_error(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(field) = duplicate_field(db_err.constraint()) {
                return StoreError::Duplicate {
                    field: field.to_string(),
                    value: email.to_string(),
                };
            }
        } else if db_err.is_check_violation() {
            let mut errors = crate::validation::FieldErrors::new();
            errors.insert("accountType".into(), db_err.message().to_string());
            return StoreError::Validation(errors);
        }
    }
    StoreError::Backend(anyhow::Error::new(err).context("insert user"))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        validate_new_user(&new)?;

        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, account_type,
                               country, is_email_verified, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.first_name)
            .bind(new.last_name.as_deref().unwrap_or(""))
            .bind(new.account_type.as_str())
            .bind(new.country.as_deref().unwrap_or(DEFAULT_COUNTRY))
            .bind(new.is_email_verified)
            .bind(new.is_active)
            .fetch_one(&self.db)
            .await
            .map_err(|e| classify_insert_error(e, &new.email))?;
        into_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find user by email")?;
        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")?;
        row.map(into_user).transpose()
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError> {
        validate_changes(&changes)?;

        let sql = format!(
            r#"
            UPDATE users SET
                first_name      = COALESCE($2, first_name),
                last_name       = COALESCE($3, last_name),
                phone           = COALESCE($4, phone),
                profile_picture = COALESCE($5, profile_picture),
                country         = COALESCE($6, country),
                city            = COALESCE($7, city),
                timezone        = COALESCE($8, timezone),
                updated_at      = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.phone)
            .bind(changes.profile_picture)
            .bind(changes.country)
            .bind(changes.city)
            .bind(changes.timezone)
            .fetch_optional(&self.db)
            .await
            .context("update user profile")?
            .ok_or(StoreError::NotFound)?;
        into_user(row)
    }

    async fn record_login(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("record login")?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
