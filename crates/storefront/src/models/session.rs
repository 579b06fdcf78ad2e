//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use emporium_core::{Email, Role, User, UserId};

/// Session-stored user identity.
///
/// A snapshot of the backend user taken at login. The bearer token is stored
/// separately under [`keys::API_TOKEN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend bearer token of the logged-in user.
    pub const API_TOKEN: &str = "api_token";

    /// Key for the guest cart's session id.
    pub const GUEST_CART_ID: &str = "guest_cart_id";

    /// Key recording which user the guest cart was last merged into.
    pub const CART_MERGED_FOR: &str = "cart_merged_for";
}
