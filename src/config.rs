use std::net::SocketAddr;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;

/// Secret used when `JWT_SECRET` is unset in development. Refused in production.
pub const DEV_JWT_SECRET: &str = "prolancer-dev-secret";

const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => bail!("unknown APP_ENV {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: Environment,
    pub host: String,
    pub port: u16,
    /// `None` selects the in-memory user store (development only).
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw)?,
            None => Environment::Development,
        };

        let secret = match (lookup("JWT_SECRET").filter(|s| !s.is_empty()), env) {
            (Some(s), Environment::Production) if s == DEV_JWT_SECRET => {
                bail!("JWT_SECRET must not use the development default in production")
            }
            (Some(s), _) => s,
            (None, Environment::Production) => {
                bail!("JWT_SECRET is required in production")
            }
            (None, Environment::Development) => {
                warn!("JWT_SECRET not set; using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        if database_url.is_none() && env == Environment::Production {
            bail!("DATABASE_URL is required in production");
        }

        let port = match lookup("APP_PORT") {
            Some(raw) => raw.parse::<u16>().context("parse APP_PORT")?,
            None => 8000,
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "prolancer".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "prolancer-users".into()),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_TTL_MINUTES),
        };

        Ok(Self {
            env,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url,
            jwt,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("parse listen address")
    }
}
