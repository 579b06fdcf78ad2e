//! Authentication calls.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use emporium_core::{AuthResponse, LoginRequest, RegisterRequest, User};

use super::{ApiClient, ApiError, Credentials};

impl ApiClient {
    /// Exchange email and password for a bearer token.
    #[instrument(skip(self, request), fields(email_domain = %request.email.domain()))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let builder = self
            .request(Method::POST, "auth/login", Credentials::Anonymous)?
            .json(request);
        self.send(builder, "account").await
    }

    /// Create an account and sign it in.
    #[instrument(skip(self, request), fields(email_domain = %request.email.domain()))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let builder = self
            .request(Method::POST, "auth/register", Credentials::Anonymous)?
            .json(request);
        self.send(builder, "account").await
    }

    /// Fetch the user a token belongs to.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SecretString) -> Result<User, ApiError> {
        let builder = self.request(Method::GET, "auth/me", Credentials::Bearer(token))?;
        self.send(builder, "account").await
    }

    /// Revoke a token.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "auth/logout", Credentials::Bearer(token))?;
        self.send_empty(builder, "session").await
    }
}
