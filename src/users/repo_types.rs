use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_COUNTRY: &str = "india";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Client,
    Freelancer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Client => "client",
            AccountType::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(AccountType::Client),
            "freelancer" => Ok(AccountType::Freelancer),
            other => Err(format!("`{other}` is not a valid account type")),
        }
    }
}

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never sent to clients
    pub first_name: String,
    pub last_name: String,
    pub account_type: AccountType,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub country: String,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Insert payload; `id` and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub account_type: AccountType,
    pub country: Option<String>,
    pub is_email_verified: bool,
    pub is_active: bool,
}

/// Editable subset of the profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
}

impl ProfileChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.phone {
            user.phone = Some(v);
        }
        if let Some(v) = self.profile_picture {
            user.profile_picture = Some(v);
        }
        if let Some(v) = self.country {
            user.country = v;
        }
        if let Some(v) = self.city {
            user.city = Some(v);
        }
        if let Some(v) = self.timezone {
            user.timezone = Some(v);
        }
    }
}

/// Raw `users` row; `account_type` is stored as text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub country: String,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            first_name: r.first_name,
            last_name: r.last_name,
            account_type: r.account_type.parse()?,
            phone: r.phone,
            profile_picture: r.profile_picture,
            country: r.country,
            city: r.city,
            timezone: r.timezone,
            is_email_verified: r.is_email_verified,
            is_active: r.is_active,
            last_login_at: r.last_login_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
