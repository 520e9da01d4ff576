use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use super::jwt::JwtKeys;
use super::services;
use crate::{
    error::{ApiJson, AppError},
    state::AppState,
    users::repo_types::AccountType,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup/:role", post(signup))
        .route("/api/users/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Path(role): Path<String>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let role: AccountType = role.parse().map_err(|reason: String| {
        warn!(%role, "signup with unknown role");
        AppError::validation("accountType", reason)
    })?;

    let keys = JwtKeys::from_ref(&state);
    let (token, _) = services::signup(&state.store, &keys, role, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User created successfully".into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let (token, _) = services::login(&state.store, &keys, payload).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
    }))
}
