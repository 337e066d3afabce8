//! Server functions for authentication
//!
//! These run on the server and bridge the browser to the identity
//! provider's sign-in flow, keeping the provider session token in the
//! server-side session.

use dioxus::prelude::*;

use crate::types::AuthUser;

/// Start a sign-in for a phone number or email identifier.
///
/// Returns the provider's sign-in id; the provider dispatches a one-time
/// code to the identifier as a side effect.
#[server]
pub async fn sign_in_start(identifier: String) -> Result<String, ServerFnError> {
    let client = identity_client();

    let sign_in = client
        .create_sign_in(&identifier)
        .await
        .map_err(crate::phone::server_fns::into_server_error)?;

    tracing::info!(sign_in_id = %sign_in.id, "sign-in started");
    Ok(sign_in.id)
}

/// Attempt the one-time-code factor of a sign-in and establish a session.
///
/// Returns `true` when the sign-in completed and a session was stored.
#[server]
pub async fn sign_in_verify(sign_in_id: String, code: String) -> Result<bool, ServerFnError> {
    let client = identity_client();

    let outcome = client
        .attempt_sign_in(&sign_in_id, &code)
        .await
        .map_err(crate::phone::server_fns::into_server_error)?;

    let Some(token) = outcome.session_token else {
        tracing::info!(status = ?outcome.status, "sign-in attempt did not complete");
        return Ok(false);
    };

    // Resolve the user behind the new session and persist both
    let user = client
        .current_user(&token)
        .await
        .map_err(crate::phone::server_fns::into_server_error)?;

    let auth_user = AuthUser {
        user_id: user.id,
        identifier: user.identifier,
    };

    set_session_token(&token).await?;
    set_session_user(&auth_user).await?;

    Ok(true)
}

/// Get the current authenticated user from the session
#[server]
pub async fn get_current_user() -> Result<Option<AuthUser>, ServerFnError> {
    get_session_user().await
}

/// Logout - clear the session
#[server]
pub async fn logout() -> Result<(), ServerFnError> {
    clear_session().await
}

// ============================================================================
// Server-only helpers (not exposed as server functions)
// ============================================================================

#[cfg(feature = "server")]
pub(crate) fn identity_client() -> identity_client::IdentityClient {
    let frontend_api = std::env::var("IDENTITY_FRONTEND_API")
        .unwrap_or_else(|_| "verified.example-app.dev".to_string());
    let api_url = std::env::var("IDENTITY_API_URL").ok();

    identity_client::IdentityClient::new(identity_client::IdentityOptions {
        frontend_api,
        api_url,
    })
}

#[cfg(feature = "server")]
const SESSION_USER_KEY: &str = "user";

#[cfg(feature = "server")]
const SESSION_TOKEN_KEY: &str = "session_token";

#[cfg(feature = "server")]
async fn session() -> Result<tower_sessions::Session, ServerFnError> {
    dioxus::fullstack::prelude::extract()
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to get session: {:?}", e)))
}

/// The provider session token for the signed-in visitor, if any.
#[cfg(feature = "server")]
pub(crate) async fn session_token() -> Result<Option<String>, ServerFnError> {
    let session = session().await?;
    session
        .get(SESSION_TOKEN_KEY)
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to read session token: {}", e)))
}

#[cfg(feature = "server")]
async fn set_session_token(token: &str) -> Result<(), ServerFnError> {
    let session = session().await?;
    session
        .insert(SESSION_TOKEN_KEY, token)
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to store session token: {}", e)))
}

#[cfg(feature = "server")]
async fn set_session_user(user: &AuthUser) -> Result<(), ServerFnError> {
    let session = session().await?;
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to set session: {}", e)))
}

#[cfg(feature = "server")]
async fn get_session_user() -> Result<Option<AuthUser>, ServerFnError> {
    let session = session().await?;
    session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to get user from session: {}", e)))
}

#[cfg(feature = "server")]
async fn clear_session() -> Result<(), ServerFnError> {
    let session = session().await?;
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(format!("Failed to clear session: {}", e)))
}
