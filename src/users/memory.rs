use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{validate_changes, validate_new_user, StoreError, UserStore};
use super::repo_types::{NewUser, ProfileChanges, User, DEFAULT_COUNTRY};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Process-local store used in development and tests.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        validate_new_user(&new)?;

        // Write lock held across check and insert keeps the email index unique.
        let mut t = self.inner.write().await;
        if t.by_email.contains_key(&new.email) {
            return Err(StoreError::Duplicate {
                field: "email".into(),
                value: new.email,
            });
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name.unwrap_or_default(),
            account_type: new.account_type,
            phone: None,
            profile_picture: None,
            country: new.country.unwrap_or_else(|| DEFAULT_COUNTRY.into()),
            city: None,
            timezone: None,
            is_email_verified: new.is_email_verified,
            is_active: new.is_active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        t.by_email.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.by_email.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError> {
        validate_changes(&changes)?;
        let mut t = self.inner.write().await;
        let user = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply(user);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn record_login(&self, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.inner.write().await;
        let user = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.last_login_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}
