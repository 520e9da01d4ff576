use serde::{Deserialize, Serialize};

use super::repo_types::{AccountType, ProfileChanges, User};

/// Profile as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: AccountType,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub country: String,
}

impl From<User> for ProfileData {
    fn from(u: User) -> Self {
        Self {
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            account_type: u.account_type,
            phone_number: u.phone,
            profile_picture: u.profile_picture,
            country: u.country,
        }
    }
}

/// Body of `PUT|PATCH /api/users/profile`. Unknown keys such as `email`
/// or `accountType` are dropped by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(alias = "phone", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone_number,
            profile_picture: r.profile_picture,
            country: r.country,
            city: r.city,
            timezone: r.timezone,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub data: ProfileData,
}
