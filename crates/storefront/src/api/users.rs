//! User administration. Every call needs an admin token.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use tracing::instrument;

use emporium_core::{Page, Role, User, UserId};

use super::{ApiClient, ApiError, Credentials, segment};

impl ApiClient {
    #[instrument(skip(self, token))]
    pub async fn list_users(
        &self,
        token: &SecretString,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<User>, ApiError> {
        let mut pairs = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(search) = search {
            pairs.push(("search", search.to_string()));
        }
        let builder = self
            .request(Method::GET, "users", Credentials::Bearer(token))?
            .query(&pairs);
        self.send(builder, "users").await
    }

    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn get_user(&self, token: &SecretString, id: &UserId) -> Result<User, ApiError> {
        let path = format!("users/{}", segment(id.as_str()));
        let builder = self.request(Method::GET, &path, Credentials::Bearer(token))?;
        self.send(builder, &format!("user {id}")).await
    }

    #[instrument(skip(self, token), fields(user_id = %id, role = %role))]
    pub async fn update_user_role(
        &self,
        token: &SecretString,
        id: &UserId,
        role: Role,
    ) -> Result<User, ApiError> {
        let path = format!("users/{}", segment(id.as_str()));
        let builder = self
            .request(Method::PATCH, &path, Credentials::Bearer(token))?
            .json(&json!({ "role": role }));
        let user = self.send(builder, &format!("user {id}")).await?;
        tracing::info!("User role updated");
        Ok(user)
    }

    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, token: &SecretString, id: &UserId) -> Result<(), ApiError> {
        let path = format!("users/{}", segment(id.as_str()));
        let builder = self.request(Method::DELETE, &path, Credentials::Bearer(token))?;
        self.send_empty(builder, &format!("user {id}")).await?;
        tracing::info!("User deleted");
        Ok(())
    }
}
