use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::storage::TokenStore;
use crate::auth::claims::Claims;

/// Storage key for the raw token string.
pub const TOKEN_KEY: &str = "prolancer_auth_token";
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to save token")]
    Storage(#[source] anyhow::Error),
}

/// Outcome of the route guard for pages that need a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(String),
    Redirect(&'static str),
}

/// Reads claims without checking the signature. Only for local UX decisions;
/// the server stays the authority on whether a token is valid.
pub fn peek_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

fn expired_locally(token: &str) -> bool {
    match peek_claims(token) {
        Some(claims) => {
            let now = OffsetDateTime::now_utc().unix_timestamp().max(0) as usize;
            claims.exp <= now
        }
        None => false,
    }
}

/// Token lifecycle on the client.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Storage failures surface to the caller.
    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token).map_err(|e| {
            warn!(error = %e, "error saving token");
            SessionError::Storage(e)
        })?;
        debug!("token saved");
        Ok(())
    }

    /// Storage failures read as "no token".
    pub fn get(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "error getting token");
                None
            }
        }
    }

    pub fn remove(&self) {
        match self.store.remove(TOKEN_KEY) {
            Ok(()) => debug!("token removed"),
            Err(e) => warn!(error = %e, "error removing token"),
        }
    }

    /// Unverified claims of the stored token, if it decodes as a JWT.
    pub fn claims(&self) -> Option<Claims> {
        self.get().as_deref().and_then(peek_claims)
    }

    /// A non-empty token is present and, when it decodes, has not passed `exp`.
    /// The signature is never checked here, but a stored JWT whose `exp` is in
    /// the past reads as logged out even though it is still stored.
    pub fn is_authenticated(&self) -> bool {
        match self.get() {
            Some(token) if !token.is_empty() => !expired_locally(&token),
            _ => false,
        }
    }

    pub fn guard(&self) -> Access {
        match self.get() {
            Some(token) if !token.is_empty() && !expired_locally(&token) => Access::Granted(token),
            _ => Access::Redirect(LOGIN_ROUTE),
        }
    }
}
