//! Directory adapter: organizational email accounts.
//!
//! Authenticates with a service-account JWT (RS256 assertion, `sub` set
//! to the admin impersonation email for domain-wide delegation),
//! exchanged at the token endpoint for a short-lived bearer token that
//! is cached for the process lifetime and refreshed before expiry.
//!
//! This adapter also owns work-email derivation: the base candidate is
//! `{first}-{l}@{domain}`, and collisions append a running counter
//! (`{first}-{l}2@`, `{first}-{l}3@`, …). The sequence is deterministic
//! so a partially completed onboarding run lands on the same address
//! when retried.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crewdeck_connector::auth::TokenCache;
use crewdeck_connector::error::{ConnectorError, ConnectorResult};
use crewdeck_connector::http::{build_client, error_for_response};
use crewdeck_connector::traits::{
    CreateOp, DeleteOp, EmailProvisioning, ListOp, LookupOp, PlatformConnector,
};
use crewdeck_connector::types::{NewUser, PlatformUser};
use crewdeck_core::Platform;

/// Upper bound on collision-counter probing when deriving an email.
const MAX_EMAIL_CANDIDATES: u32 = 50;

/// Directory adapter configuration.
#[derive(Clone)]
pub struct DirectoryConfig {
    /// Directory API base URL.
    pub base_url: String,
    /// OAuth token endpoint for the JWT-bearer grant.
    pub token_url: String,
    /// Service account identity (JWT issuer).
    pub service_account_email: String,
    /// PEM-encoded RSA private key of the service account.
    pub private_key_pem: String,
    /// Admin account impersonated for directory operations.
    pub admin_email: String,
    /// Directory customer id.
    pub customer_id: String,
    /// Domain new work emails are issued under.
    pub domain: String,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("base_url", &self.base_url)
            .field("service_account_email", &self.service_account_email)
            .field("admin_email", &self.admin_email)
            .field("domain", &self.domain)
            .field("private_key_pem", &"[redacted]")
            .finish_non_exhaustive()
    }
}

/// Claims of the service-account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    scope: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Upstream user record shape.
#[derive(Debug, Deserialize)]
struct DirectoryUser {
    id: String,
    #[serde(rename = "primaryEmail")]
    primary_email: String,
    #[serde(default)]
    name: Option<DirectoryUserName>,
    #[serde(default)]
    suspended: bool,
}

#[derive(Debug, Deserialize)]
struct DirectoryUserName {
    #[serde(rename = "givenName", default)]
    given_name: Option<String>,
    #[serde(rename = "familyName", default)]
    family_name: Option<String>,
    #[serde(rename = "fullName", default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default)]
    users: Vec<DirectoryUser>,
}

/// Directory (identity/email) platform adapter.
pub struct DirectoryConnector {
    config: DirectoryConfig,
    client: Client,
    token: TokenCache,
}

impl DirectoryConnector {
    pub fn new(config: DirectoryConfig) -> ConnectorResult<Self> {
        if config.service_account_email.is_empty() || config.private_key_pem.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "directory service account credentials are not configured",
            ));
        }
        Ok(Self {
            config,
            client: build_client()?,
            token: TokenCache::new(),
        })
    }

    /// Derive the base work-email candidate for a name.
    #[must_use]
    pub fn derive_email(first_name: &str, last_name: &str, domain: &str) -> String {
        let first = first_name.trim().to_lowercase();
        let initial = last_name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_lowercase().to_string())
            .unwrap_or_default();
        format!("{first}-{initial}@{domain}")
    }

    /// The nth candidate in the deterministic collision sequence.
    /// `n == 1` is the base candidate; `n == 2` appends "2", and so on.
    #[must_use]
    pub fn candidate_email(first_name: &str, last_name: &str, domain: &str, n: u32) -> String {
        let base = Self::derive_email(first_name, last_name, domain);
        if n <= 1 {
            return base;
        }
        match base.split_once('@') {
            Some((local, host)) => format!("{local}{n}@{host}"),
            None => base,
        }
    }

    async fn bearer_token(&self) -> ConnectorResult<String> {
        if let Some(token) = self.token.get().await {
            return Ok(token);
        }

        debug!("fetching directory access token");
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.config.service_account_email,
            sub: &self.config.admin_email,
            aud: &self.config.token_url,
            scope: "directory.user",
            iat: now,
            exp: now + 3600,
        };

        let key =
            EncodingKey::from_rsa_pem(self.config.private_key_pem.as_bytes()).map_err(|e| {
                ConnectorError::invalid_configuration(format!(
                    "directory private key is not valid RSA PEM: {e}"
                ))
            })?;
        let assertion =
            encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
                ConnectorError::invalid_configuration(format!("failed to sign assertion: {e}"))
            })?;

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "directory token exchange failed");
            return Err(ConnectorError::AuthenticationFailed {
                platform: Platform::Directory,
            });
        }

        let token: TokenResponse = response.json().await?;
        self.token
            .store(&token.access_token, Duration::from_secs(token.expires_in))
            .await;
        Ok(token.access_token)
    }

    fn map_user(user: DirectoryUser) -> PlatformUser {
        let mut mapped = PlatformUser::new(user.id, user.primary_email);
        if let Some(name) = user.name {
            mapped.first_name = name.given_name;
            mapped.last_name = name.family_name;
            mapped.name = name.full_name;
        }
        mapped.status = Some(if user.suspended {
            "suspended".to_string()
        } else {
            "active".to_string()
        });
        mapped
    }

    fn generate_password() -> String {
        const CHARSET: &[u8] =
            b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
        let mut rng = rand::thread_rng();
        (0..16)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }
}

impl PlatformConnector for DirectoryConnector {
    fn platform(&self) -> Platform {
        Platform::Directory
    }

    fn display_name(&self) -> &str {
        "directory"
    }
}

#[async_trait]
impl LookupOp for DirectoryConnector {
    async fn find_by_email(&self, email: &str) -> ConnectorResult<Option<PlatformUser>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!("{}/users/{email}", self.config.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(email, "directory user not found");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Directory, status, &body));
        }

        let user: DirectoryUser = response.json().await?;
        Ok(Some(Self::map_user(user)))
    }
}

#[async_trait]
impl CreateOp for DirectoryConnector {
    async fn create_user(&self, user: &NewUser) -> ConnectorResult<PlatformUser> {
        let token = self.bearer_token().await?;
        let password = user
            .password
            .clone()
            .unwrap_or_else(Self::generate_password);

        let body = json!({
            "primaryEmail": user.email,
            "name": {
                "givenName": user.first_name,
                "familyName": user.last_name,
            },
            "password": password,
            "changePasswordAtNextLogin": true,
        });

        let response = self
            .client
            .post(format!("{}/users", self.config.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Directory, status, &body));
        }

        let created: DirectoryUser = response.json().await?;
        info!(email = %created.primary_email, "directory account created");
        Ok(Self::map_user(created))
    }
}

#[async_trait]
impl DeleteOp for DirectoryConnector {
    async fn delete_user(&self, identifier: &str) -> ConnectorResult<()> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .delete(format!("{}/users/{identifier}", self.config.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        // Deleting an absent account is success: the desired end state holds.
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(identifier, "directory user already absent");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Directory, status, &body));
        }
        info!(identifier, "directory account deleted");
        Ok(())
    }
}

#[async_trait]
impl ListOp for DirectoryConnector {
    async fn list_users(&self) -> ConnectorResult<Vec<PlatformUser>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!("{}/users", self.config.base_url))
            .query(&[
                ("customer", self.config.customer_id.as_str()),
                ("maxResults", "500"),
                ("orderBy", "email"),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_response(Platform::Directory, status, &body));
        }

        let list: UserListResponse = response.json().await?;
        Ok(list.users.into_iter().map(Self::map_user).collect())
    }
}

#[async_trait]
impl EmailProvisioning for DirectoryConnector {
    fn base_email(&self, first_name: &str, last_name: &str) -> String {
        Self::derive_email(first_name, last_name, &self.config.domain)
    }

    async fn generate_email(&self, first_name: &str, last_name: &str) -> ConnectorResult<String> {
        for n in 1..=MAX_EMAIL_CANDIDATES {
            let candidate =
                Self::candidate_email(first_name, last_name, &self.config.domain, n);
            if self.find_by_email(&candidate).await?.is_none() {
                if n > 1 {
                    debug!(candidate, "email collision resolved with counter");
                }
                return Ok(candidate);
            }
        }
        Err(ConnectorError::resource_exhausted(format!(
            "no free email candidate for {first_name} {last_name} within {MAX_EMAIL_CANDIDATES} attempts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_email() {
        assert_eq!(
            DirectoryConnector::derive_email("John", "Doe", "example.com"),
            "john-d@example.com"
        );
        assert_eq!(
            DirectoryConnector::derive_email(" Ann ", "Lee", "example.com"),
            "ann-l@example.com"
        );
    }

    #[test]
    fn test_candidate_sequence_is_deterministic() {
        let first = DirectoryConnector::candidate_email("John", "Doe", "example.com", 1);
        let second = DirectoryConnector::candidate_email("John", "Doe", "example.com", 2);
        let third = DirectoryConnector::candidate_email("John", "Doe", "example.com", 3);
        assert_eq!(first, "john-d@example.com");
        assert_eq!(second, "john-d2@example.com");
        assert_eq!(third, "john-d3@example.com");

        // Stable across repeated calls.
        assert_eq!(
            second,
            DirectoryConnector::candidate_email("John", "Doe", "example.com", 2)
        );
    }

    #[test]
    fn test_generated_password_shape() {
        let pw = DirectoryConnector::generate_password();
        assert_eq!(pw.len(), 16);
        let other = DirectoryConnector::generate_password();
        // Not a strict guarantee, but two 16-char draws colliding means
        // the generator is broken.
        assert_ne!(pw, other);
    }
}
