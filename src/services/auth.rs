//! Authentication service: OpenID Connect login and session tokens

use std::time::Duration;

use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;

use crate::{
    config::{AuthConfig, OAuthConfig},
    error::{AppError, AppResult},
    models::user::{NewUser, RequestContext, SessionClaims, User},
    repository::Repository,
};

/// Endpoints published in the provider discovery document
#[derive(Debug, Deserialize)]
struct ProviderMetadata {
    authorization_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subset of the OpenID userinfo response we rely on
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUserInfo {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    auth: AuthConfig,
    oauth: OAuthConfig,
    http: reqwest::Client,
}

fn upstream(err: reqwest::Error) -> AppError {
    AppError::Upstream(err.to_string())
}

impl AuthService {
    pub fn new(repository: Repository, auth: AuthConfig, oauth: OAuthConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { repository, auth, oauth, http })
    }

    /// Random value binding the authorization redirect to its callback
    pub fn new_state() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    async fn discover(&self) -> AppResult<ProviderMetadata> {
        self.http
            .get(&self.oauth.discovery_url)
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json::<ProviderMetadata>()
            .await
            .map_err(upstream)
    }

    /// Provider URL the browser is redirected to for login
    pub async fn authorization_url(&self, state: &str) -> AppResult<String> {
        let metadata = self.discover().await?;
        let mut url = reqwest::Url::parse(&metadata.authorization_endpoint)
            .map_err(|e| AppError::Upstream(format!("Invalid authorization endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("redirect_uri", &self.oauth.redirect_url)
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for the user's identity and a session token
    pub async fn complete_login(&self, code: &str) -> AppResult<(User, String)> {
        let metadata = self.discover().await?;

        let token = self
            .http
            .post(&metadata.token_endpoint)
            .basic_auth(&self.oauth.client_id, Some(&self.oauth.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.oauth.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json::<TokenResponse>()
            .await
            .map_err(upstream)?;

        let info = self
            .http
            .get(&metadata.userinfo_endpoint)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json::<ProviderUserInfo>()
            .await
            .map_err(upstream)?;

        let user = self.register_login(info).await?;
        let session = self.issue_token(&user)?;
        Ok((user, session))
    }

    /// Find the user by email, creating it on first login
    pub async fn register_login(&self, info: ProviderUserInfo) -> AppResult<User> {
        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::Authentication("Identity provider returned no email".to_string()))?;

        if let Some(user) = self.repository.users.find_by_email(&email).await? {
            return Ok(user);
        }

        let user = self
            .repository
            .users
            .create(&NewUser {
                provider_id: info.sub,
                name: info.name,
                email,
            })
            .await?;
        tracing::info!(user_id = user.id, email = %user.email, "User registered on first login");
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        SessionClaims::for_user(user, self.auth.jwt_expiration_hours)
            .create_token(&self.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<RequestContext> {
        let claims = SessionClaims::from_token(token, &self.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        if claims.sub.is_empty() {
            return Err(AppError::Authentication("Session has no identity".to_string()));
        }
        Ok(RequestContext::from(claims))
    }

    /// Equipment administration is open to everyone unless admins are configured
    pub fn require_admin(&self, ctx: &RequestContext) -> AppResult<()> {
        if self.auth.admin_emails.is_empty()
            || self
                .auth
                .admin_emails
                .iter()
                .any(|admin| admin.eq_ignore_ascii_case(&ctx.email))
        {
            Ok(())
        } else {
            Err(AppError::Authorization("Equipment administration requires an administrator".to_string()))
        }
    }
}
