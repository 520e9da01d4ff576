use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ProfileData, ProfileResponse, UpdateProfileRequest};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users/profile",
        get(get_profile).put(update_profile).patch(update_profile),
    )
}

#[instrument(skip_all)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile fetched successfully".into(),
        data: ProfileData::from(user),
    }))
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .update_profile(session.user_id, payload.into())
        .await?;

    info!(user_id = %session.user_id, "profile updated");
    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated successfully".into(),
        data: ProfileData::from(user),
    }))
}
