use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, SessionClaims};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

/// HS256 signing and verification keys with issuer/audience/TTL.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn issue(&self, session: &SessionClaims) -> anyhow::Result<String> {
        self.issue_with_ttl(session, self.ttl)
    }

    pub fn issue_with_ttl(&self, session: &SessionClaims, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            session: session.clone(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %session.user_id, role = %session.role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        debug!(user_id = %data.claims.session.user_id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::AccountType;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60 * 24 * 7,
        })
    }

    fn session() -> SessionClaims {
        SessionClaims {
            user_id: Uuid::new_v4(),
            email: "a@b.com".into(),
            role: AccountType::Client,
        }
    }

    #[test]
    fn issue_and_verify_returns_claims() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let s = session();
        let token = keys.issue(&s).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.session, s);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&session()).unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<u8> = sig.bytes().collect();
        sig[0] = if sig[0] == b'A' { b'B' } else { b'A' };
        let forged = format!("{head}.{}", String::from_utf8(sig).unwrap());
        assert_eq!(keys.verify(&forged).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = make_keys("one", "iss", "aud").issue(&session()).unwrap();
        let err = make_keys("two", "iss", "aud").verify(&token).unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn expired_token_is_distinguished() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys
            .issue_with_ttl(&session(), Duration::hours(-2))
            .unwrap();
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(&session()).unwrap();
        assert_eq!(bad.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = make_keys("s", "i", "a");
        assert_eq!(keys.verify("not.a.jwt").unwrap_err(), TokenError::Invalid);
        assert_eq!(keys.verify("").unwrap_err(), TokenError::Invalid);
    }
}
