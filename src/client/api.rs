use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::cancel::CancelToken;
use super::session::{Session, SessionError};
use crate::auth::dto::AuthResponse;
use crate::users::dto::{ProfileData, ProfileResponse, UpdateProfileRequest};
use crate::users::repo_types::AccountType;
use crate::validation::{validate_signup, FieldErrors};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PROLANCER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error. Please check your internet connection.")]
    Network(String),

    #[error("{message}")]
    Rejected {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("{}", .0.values().next().map(String::as_str).unwrap_or("Invalid input"))]
    Invalid(FieldErrors),

    #[error("Request cancelled")]
    Cancelled,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Unexpected response from server")]
    Decode(String),
}

impl ApiError {
    /// The single line shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Signup form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupPayload<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    // Field name kept for wire compatibility; carries the plaintext password.
    password_hash: &'a str,
}

#[derive(Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// HTTP client for the account API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn signup(
        &self,
        role: AccountType,
        form: &SignupForm,
        cancel: &CancelToken,
    ) -> Result<AuthResponse, ApiError> {
        let errors = validate_signup(&form.first_name, &form.email, &form.password);
        if !errors.is_empty() {
            return Err(ApiError::Invalid(errors));
        }

        let payload = SignupPayload {
            first_name: &form.first_name,
            last_name: &form.last_name,
            email: &form.email,
            password_hash: &form.password,
        };
        let url = self.config.api_url(&format!("/signup/{role}"));
        let res: AuthResponse = self.send(self.http.post(url).json(&payload), cancel).await?;
        self.adopt_token(res, cancel)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        cancel: &CancelToken,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.config.api_url("/api/users/login");
        let req = self.http.post(url).json(&LoginPayload { email, password });
        let res: AuthResponse = self.send(req, cancel).await?;
        self.adopt_token(res, cancel)
    }

    pub async fn profile(&self, cancel: &CancelToken) -> Result<ProfileData, ApiError> {
        let url = self.config.api_url("/api/users/profile");
        let res: ProfileResponse = self.send(self.http.get(url), cancel).await?;
        Ok(res.data)
    }

    pub async fn update_profile(
        &self,
        changes: &UpdateProfileRequest,
        cancel: &CancelToken,
    ) -> Result<ProfileData, ApiError> {
        let url = self.config.api_url("/api/users/profile");
        let res: ProfileResponse = self.send(self.http.put(url).json(changes), cancel).await?;
        Ok(res.data)
    }

    pub fn logout(&self) {
        self.session.remove();
    }

    fn adopt_token(&self, res: AuthResponse, cancel: &CancelToken) -> Result<AuthResponse, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if !res.success || res.token.is_empty() {
            return Err(ApiError::Rejected {
                status: 200,
                kind: None,
                message: res.message,
            });
        }
        self.session.save(&res.token)?;
        Ok(res)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        mut req: RequestBuilder,
        cancel: &CancelToken,
    ) -> Result<T, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if let Some(token) = self.session.get().filter(|t| !t.is_empty()) {
            req = req.bearer_auth(token);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("request cancelled");
                Err(ApiError::Cancelled)
            }
            res = async {
                let resp = req.send().await.map_err(|e| {
                    warn!(error = %e, "network error");
                    ApiError::Network(e.to_string())
                })?;
                read_response(resp).await
            } => res,
        }
    }
}

async fn read_response<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        warn!("unauthorized access");
    }
    let body = resp.json::<FailureBody>().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        kind: body.kind,
        message: body.message.unwrap_or_else(|| "An error occurred".into()),
    })
}
