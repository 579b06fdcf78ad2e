//! Guest cart identity and the guest-to-user cart merge.
//!
//! Anonymous visitors get a [`SessionToken`] the first time they change their
//! cart. It lives in the server-side session and is sent to the backend as
//! `X-Session-Id`. When the visitor signs in, [`reconcile_on_login`] folds the
//! guest cart into the user's cart with a single replace request.

use secrecy::SecretString;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use emporium_core::{Cart, SessionToken, UserId, merge_items};

use crate::api::{ApiClient, ApiError, CartKey, CartOwner};
use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Errors from reading or writing cart state in the session.
#[derive(Debug, thiserror::Error)]
pub enum CartSessionError {
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Why a login did not merge anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The visitor never had a guest cart.
    NoGuestCart,
    /// This session's guest cart was already merged into this user.
    AlreadyMerged,
    /// The guest cart had no lines.
    EmptyGuestCart,
}

/// Outcome of [`reconcile_on_login`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    Merged { added: usize, combined: usize },
    Skipped(SkipReason),
    /// The merge request failed. The guest cart is kept for a later login.
    Failed,
}

// =============================================================================
// Guest Token
// =============================================================================

/// The guest cart token, if this session has one.
///
/// A value that no longer parses is dropped from the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn guest_token(session: &Session) -> Result<Option<SessionToken>, CartSessionError> {
    match session.get::<SessionToken>(session_keys::GUEST_CART_ID).await {
        Ok(token) => Ok(token),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            warn!(error = %e, "Discarding malformed guest cart id");
            session
                .remove_value(session_keys::GUEST_CART_ID)
                .await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// The guest cart token, generating and storing one if needed.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn ensure_guest_token(session: &Session) -> Result<SessionToken, CartSessionError> {
    if let Some(token) = guest_token(session).await? {
        return Ok(token);
    }

    let token = SessionToken::generate();
    session
        .insert(session_keys::GUEST_CART_ID, &token)
        .await?;
    Ok(token)
}

/// Resolve whose cart this request operates on.
///
/// A signed-in user always owns the cart. Guests are identified by their
/// token; with `create` set a token is issued when missing, otherwise a guest
/// without one has no cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn resolve_owner(
    session: &Session,
    create: bool,
) -> Result<Option<CartOwner>, CartSessionError> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    let token = session.get::<String>(session_keys::API_TOKEN).await?;

    if let (Some(user), Some(token)) = (user, token) {
        return Ok(Some(CartOwner::User {
            id: user.id,
            token: SecretString::from(token),
        }));
    }

    let guest = if create {
        Some(ensure_guest_token(session).await?)
    } else {
        guest_token(session).await?
    };
    Ok(guest.map(CartOwner::Guest))
}

/// The visitor's cart. A guest without a token has an empty cart and no
/// request is made.
///
/// # Errors
///
/// Returns an error if the session store or the backend fails.
pub async fn current_cart(api: &ApiClient, session: &Session) -> Result<Cart, AppError> {
    match resolve_owner(session, false).await? {
        Some(owner) => Ok(api.get_cart(&owner).await?),
        None => Ok(Cart::default()),
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Merge the guest cart into the user's cart after a login.
///
/// Runs at most one merge per guest cart and user: the guest token is taken
/// out of the session first and a `cart_merged_for` marker is recorded on
/// success. Failures never fail the login; the guest token is put back so a
/// later login can retry.
#[instrument(skip(api, session, user, token), fields(user_id = %user.id))]
pub async fn reconcile_on_login(
    api: &ApiClient,
    session: &Session,
    user: &CurrentUser,
    token: &SecretString,
) -> MergeResult {
    let guest = match take_guest_token(session).await {
        Ok(Some(guest)) => guest,
        Ok(None) => return MergeResult::Skipped(SkipReason::NoGuestCart),
        Err(e) => {
            warn!(error = %e, "Could not read guest cart id");
            return MergeResult::Failed;
        }
    };

    let merged_for = session
        .get::<UserId>(session_keys::CART_MERGED_FOR)
        .await
        .ok()
        .flatten();
    if merged_for.as_ref() == Some(&user.id) {
        return MergeResult::Skipped(SkipReason::AlreadyMerged);
    }

    match merge_guest_cart(api, &guest, user, token).await {
        Ok(Some((added, combined))) => {
            if let Err(e) = session
                .insert(session_keys::CART_MERGED_FOR, &user.id)
                .await
            {
                warn!(error = %e, "Could not record cart merge");
            }

            // The guest cart is spent; a failed delete just leaves it to expire.
            let guest_owner = CartOwner::Guest(guest.clone());
            if let Err(e) = api.clear_cart(&guest_owner).await {
                warn!(error = %e, "Could not delete guest cart after merge");
            }
            api.invalidate_carts(&[CartKey::Guest(guest), CartKey::User(user.id.clone())])
                .await;

            info!(added, combined, "Guest cart merged");
            MergeResult::Merged { added, combined }
        }
        Ok(None) => MergeResult::Skipped(SkipReason::EmptyGuestCart),
        Err(e) => {
            warn!(error = %e, "Cart merge failed");
            if let Err(e) = session.insert(session_keys::GUEST_CART_ID, &guest).await {
                warn!(error = %e, "Could not restore guest cart id");
            }
            MergeResult::Failed
        }
    }
}

async fn take_guest_token(session: &Session) -> Result<Option<SessionToken>, CartSessionError> {
    let token = guest_token(session).await?;
    if token.is_some() {
        session.remove_value(session_keys::GUEST_CART_ID).await?;
    }
    Ok(token)
}

/// Both carts are read from the backend; a cached copy may predate changes
/// made from another session and the replace request would drop them.
///
/// Returns `None` when the guest cart is empty and nothing was sent.
async fn merge_guest_cart(
    api: &ApiClient,
    guest: &SessionToken,
    user: &CurrentUser,
    token: &SecretString,
) -> Result<Option<(usize, usize)>, ApiError> {
    let guest_cart = api.fetch_cart(&CartOwner::Guest(guest.clone())).await?;
    if guest_cart.is_empty() {
        return Ok(None);
    }

    let user_owner = CartOwner::User {
        id: user.id.clone(),
        token: token.clone(),
    };
    let user_cart = api.fetch_cart(&user_owner).await?;

    let outcome = merge_items(&user_cart.items, &guest_cart.items);
    api.replace_cart(&user.id, token, &outcome.lines()).await?;

    Ok(Some((outcome.added, outcome.combined)))
}

/// Remove the user, token and merge marker and destroy the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_on_logout(session: &Session) -> Result<(), CartSessionError> {
    session.remove_value(session_keys::CURRENT_USER).await?;
    session.remove_value(session_keys::API_TOKEN).await?;
    session.remove_value(session_keys::CART_MERGED_FOR).await?;
    session.flush().await?;
    Ok(())
}
