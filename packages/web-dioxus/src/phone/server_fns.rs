//! Server functions for phone number operations
//!
//! Each function resolves the visitor's provider session token from the
//! server-side session and forwards the call to the identity provider.
//! Provider failures are logged in full here; only the primary
//! `{code, message}` travels back to the browser, JSON-encoded in the
//! `ServerFnError` message so the form can restore it.

use dioxus::prelude::*;

use super::form::{PendingPhoneNumber, PhoneNumberEntry, VerificationOutcome};

/// Create an unverified phone number on the signed-in user's account.
#[server]
pub async fn create_phone_number(
    phone_number: String,
) -> Result<PendingPhoneNumber, ServerFnError> {
    let (client, token) = identity_session().await?;

    let resource = client
        .create_phone_number(&token, &phone_number)
        .await
        .map_err(into_server_error)?;

    Ok(PendingPhoneNumber {
        id: resource.id,
        phone_number: resource.phone_number,
    })
}

/// Ask the provider to dispatch the one-time code for a pending number.
#[server]
pub async fn prepare_verification(phone_number_id: String) -> Result<(), ServerFnError> {
    let (client, token) = identity_session().await?;

    client
        .prepare_verification(&token, &phone_number_id)
        .await
        .map_err(into_server_error)?;

    Ok(())
}

/// Check a one-time code and report the resulting verification status.
#[server]
pub async fn attempt_verification(
    phone_number_id: String,
    code: String,
) -> Result<VerificationOutcome, ServerFnError> {
    let (client, token) = identity_session().await?;

    let resource = client
        .attempt_verification(&token, &phone_number_id, &code)
        .await
        .map_err(into_server_error)?;

    Ok(outcome_of(&resource))
}

/// Delete one phone number from the signed-in user's account.
#[server]
pub async fn destroy_phone_number(phone_number_id: String) -> Result<(), ServerFnError> {
    let (client, token) = identity_session().await?;

    client
        .destroy_phone_number(&token, &phone_number_id)
        .await
        .map_err(into_server_error)?;

    Ok(())
}

/// The signed-in user's phone numbers, in provider order.
#[server]
pub async fn list_phone_numbers() -> Result<Vec<PhoneNumberEntry>, ServerFnError> {
    let (client, token) = identity_session().await?;

    let resources = client
        .list_phone_numbers(&token)
        .await
        .map_err(into_server_error)?;

    Ok(resources
        .iter()
        .map(|resource| PhoneNumberEntry {
            id: resource.id.clone(),
            phone_number: resource.phone_number.clone(),
            status: outcome_of(resource),
        })
        .collect())
}

// ============================================================================
// Server-only helpers (not exposed as server functions)
// ============================================================================

#[cfg(feature = "server")]
async fn identity_session() -> Result<(identity_client::IdentityClient, String), ServerFnError> {
    let token = crate::auth::session_token()
        .await?
        .ok_or_else(|| ServerFnError::new(not_signed_in_payload()))?;
    Ok((crate::auth::identity_client(), token))
}

#[cfg(feature = "server")]
fn not_signed_in_payload() -> String {
    serde_json::json!({
        "code": "authentication_invalid",
        "message": "You must be signed in to manage phone numbers"
    })
    .to_string()
}

#[cfg(feature = "server")]
fn outcome_of(resource: &identity_client::PhoneNumberResource) -> VerificationOutcome {
    use identity_client::VerificationStatus;

    let status = resource
        .verification
        .as_ref()
        .map(|verification| verification.status)
        .unwrap_or(VerificationStatus::Unverified);

    match status {
        VerificationStatus::Verified => VerificationOutcome::Verified,
        VerificationStatus::Failed => VerificationOutcome::Failed,
        VerificationStatus::Expired => VerificationOutcome::Expired,
        VerificationStatus::Unverified | VerificationStatus::Unknown => {
            VerificationOutcome::Unverified
        }
    }
}

/// Map a provider client error into a `ServerFnError` whose message carries
/// the primary `{code, message}` as JSON. Exhaustive over the client error
/// taxonomy; the full error is logged before it is narrowed.
#[cfg(feature = "server")]
pub(crate) fn into_server_error(err: identity_client::ClientError) -> ServerFnError {
    use identity_client::ClientError;

    let payload = match &err {
        ClientError::Provider(errors) => {
            tracing::error!(errors = ?errors.errors, "identity provider call failed");
            let primary = errors.primary();
            serde_json::json!({ "code": primary.code, "message": primary.message })
        }
        ClientError::Network(source) => {
            tracing::error!(error = %source, "identity provider unreachable");
            serde_json::json!({
                "code": "network_error",
                "message": "The identity provider could not be reached"
            })
        }
        ClientError::Decode(source) => {
            tracing::error!(error = %source, "identity provider response did not decode");
            serde_json::json!({
                "code": "decode_error",
                "message": "The identity provider sent an unreadable response"
            })
        }
        ClientError::Unexpected(status) => {
            tracing::error!(%status, "identity provider returned an unexpected status");
            serde_json::json!({
                "code": "unexpected_response",
                "message": format!("The identity provider answered with status {status}")
            })
        }
    };

    ServerFnError::new(payload.to_string())
}
