use async_trait::async_trait;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, ProfileChanges, User};
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{field} already exists")]
    Duplicate { field: String, value: String },

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence of user accounts. One record per email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError>;
    async fn record_login(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Schema-level checks every store applies before inserting.
pub fn validate_new_user(user: &NewUser) -> Result<(), StoreError> {
    let mut errors = FieldErrors::new();
    if user.email.trim().is_empty() {
        errors.insert("email".into(), "Path `email` is required.".into());
    }
    if user.password_hash.is_empty() {
        errors.insert("passwordHash".into(), "Path `passwordHash` is required.".into());
    }
    if user.first_name.trim().is_empty() {
        errors.insert("firstName".into(), "Path `firstName` is required.".into());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(errors))
    }
}

pub fn validate_changes(changes: &ProfileChanges) -> Result<(), StoreError> {
    match &changes.first_name {
        Some(name) if name.trim().is_empty() => {
            let mut errors = FieldErrors::new();
            errors.insert("firstName".into(), "Path `firstName` is required.".into());
            Err(StoreError::Validation(errors))
        }
        _ => Ok(()),
    }
}
