use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use super::claims::SessionClaims;
use super::dto::{LoginRequest, SignupRequest};
use super::jwt::JwtKeys;
use super::password::{burn_verification, hash_password, verify_password};
use crate::error::AppError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{AccountType, NewUser};
use crate::validation::validate_signup;

pub const LOGIN_FAILED: &str = "Invalid email or password";

async fn hash_off_thread(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("join hash task")?
}

async fn verify_off_thread(plain: String, hash: Option<String>) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || match hash {
        Some(h) => verify_password(&plain, &h),
        None => {
            burn_verification(&plain);
            false
        }
    })
    .await
    .context("join verify task")
}

/// Creates the account and mints its first token.
pub async fn signup(
    store: &Arc<dyn UserStore>,
    keys: &JwtKeys,
    role: AccountType,
    req: SignupRequest,
) -> Result<(String, SessionClaims), AppError> {
    let errors = validate_signup(&req.first_name, &req.email, &req.password);
    if !errors.is_empty() {
        warn!(email = %req.email, fields = ?errors.keys().collect::<Vec<_>>(), "signup rejected");
        return Err(AppError::Validation(errors));
    }

    let password_hash = hash_off_thread(req.password).await?;

    let user = store
        .create(NewUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            account_type: role,
            country: None,
            is_email_verified: true,
            is_active: true,
        })
        .await?;

    let session = SessionClaims::from(&user);
    let token = keys.issue(&session)?;
    info!(user_id = %user.id, role = %role, "user signed up");
    Ok((token, session))
}

/// Checks credentials. Every failure looks the same to the caller.
pub async fn login(
    store: &Arc<dyn UserStore>,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<(String, SessionClaims), AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::auth(LOGIN_FAILED));
    }

    let user = store.find_by_email(&req.email).await?;
    let ok = verify_off_thread(req.password, user.as_ref().map(|u| u.password_hash.clone())).await?;

    let user = match user {
        Some(u) if ok && u.is_active => u,
        Some(u) => {
            warn!(user_id = %u.id, active = u.is_active, "login rejected");
            return Err(AppError::auth(LOGIN_FAILED));
        }
        None => {
            warn!("login for unknown email");
            return Err(AppError::auth(LOGIN_FAILED));
        }
    };

    if let Err(e) = store.record_login(user.id).await {
        warn!(error = %e, user_id = %user.id, "failed to record login time");
    }

    let session = SessionClaims::from(&user);
    let token = keys.issue(&session)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, session))
}
