//! Session issuance and termination.
//!
//! Logins are checked against a [`CredentialStore`] and answered with a signed JWT.
//! Logouts record the token id in a [`RevocationStore`] so that [`AuthService::verify`]
//! rejects it for the rest of its lifetime.

use crate::config::ClinicConfig;
use crate::constants::TOKEN_TYPE;
use crate::error::{ClinicError, ClinicResult};
use crate::password::{self, verify_password};
use crate::repositories::credentials::CredentialStore;
use crate::repositories::revocations::RevocationStore;
use api_shared::dto::TokenRes;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenRes {
    fn from(t: IssuedToken) -> Self {
        TokenRes {
            access_token: t.access_token,
            token_type: t.token_type.to_string(),
            expires_in: t.expires_in,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    revocations: Arc<dyn RevocationStore>,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    // Checked in place of a real hash when the username is unknown.
    unknown_user_hash: Arc<str>,
}

impl AuthService {
    /// Builds the service from the signing settings in `cfg`.
    ///
    /// # Arguments
    /// * `cfg` - Supplies the secret, algorithm and token lifetime
    /// * `credentials` - Source of password hashes
    /// * `revocations` - Where logged-out token ids are recorded
    pub fn new(
        cfg: &ClinicConfig,
        credentials: Arc<dyn CredentialStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        let secret = cfg.secret_key().as_bytes();
        let iterations = cfg
            .users()
            .iter()
            .filter_map(|u| password::iterations_of(&u.password_hash))
            .max()
            .unwrap_or(password::DEFAULT_ITERATIONS);
        Self {
            credentials,
            revocations,
            algorithm: cfg.algorithm(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::minutes(cfg.access_token_expire_minutes()),
            unknown_user_hash: password::unmatchable_hash(iterations).into(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation()).map(|data| data.claims)
    }

    /// Checks the credentials and issues a token valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Unauthorized` if the user is unknown or the password does
    /// not match, and `ClinicError::Internal` if the store or signing fails.
    pub async fn login(&self, username: &str, password: &str) -> ClinicResult<IssuedToken> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClinicError::Unauthorized);
        }

        let stored = self
            .credentials
            .password_hash(username)
            .await
            .map_err(ClinicError::internal)?;

        // Unknown users pay for a full verification too, so response time does not
        // reveal which usernames exist.
        let known = stored.is_some();
        let hash = stored.unwrap_or_else(|| self.unknown_user_hash.to_string());
        let password = password.to_owned();
        // PBKDF2 is CPU bound.
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(ClinicError::internal)?;
        let verified = known && matched;

        if !verified {
            tracing::warn!(username, "login rejected");
            return Err(ClinicError::Unauthorized);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };
        let access_token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(ClinicError::internal)?;

        tracing::info!(username, "login succeeded");
        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Revokes `token` if it is still valid.
    ///
    /// Missing, malformed, expired and already revoked tokens are accepted silently so
    /// that logging out is idempotent.
    pub async fn logout(&self, token: Option<&str>) -> ClinicResult<()> {
        let Some(token) = token else {
            return Ok(());
        };

        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("logout with unusable token: {}", e);
                return Ok(());
            }
        };

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
        self.revocations
            .revoke(&claims.jti, expires_at)
            .await
            .map_err(ClinicError::internal)?;
        tracing::info!(username = %claims.sub, "logged out");
        Ok(())
    }

    /// Decodes a token and checks it has not been revoked.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Unauthorized` for invalid, expired or revoked tokens.
    pub async fn verify(&self, token: &str) -> ClinicResult<Claims> {
        let claims = self.decode(token).map_err(|_| ClinicError::Unauthorized)?;
        let revoked = self
            .revocations
            .is_revoked(&claims.jti)
            .await
            .map_err(ClinicError::internal)?;
        if revoked {
            return Err(ClinicError::Unauthorized);
        }
        Ok(claims)
    }
}
