//! Wire types for the identity provider's frontend API

use serde::{Deserialize, Serialize};

/// A phone number resource owned by the provider.
///
/// Freshly created numbers have no verification object until a verification
/// has been prepared or attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumberResource {
    pub id: String,
    pub phone_number: String,
    #[serde(default)]
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
}

/// Verification state of a phone number, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Failed,
    Expired,
    /// Forward compatibility with statuses this client does not know about
    #[serde(other)]
    Unknown,
}

/// The authenticated user as seen by the frontend API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Primary identifier the user signed in with (phone number or email)
    pub identifier: String,
}

/// A sign-in attempt created for an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIn {
    pub id: String,
    pub status: SignInStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInStatus {
    NeedsFirstFactor,
    Complete,
    #[serde(other)]
    Unknown,
}

/// Result of attempting the first factor of a sign-in.
///
/// `session_token` is present only when the sign-in is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInOutcome {
    pub status: SignInStatus,
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Deletion acknowledgement returned by destroy endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResource {
    pub id: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_resource_decodes_without_verification() {
        let body = r#"{"id":"idn_abc123","phone_number":"+15551234567"}"#;
        let resource: PhoneNumberResource = serde_json::from_str(body).unwrap();
        assert_eq!(resource.id, "idn_abc123");
        assert!(resource.verification.is_none());
    }

    #[test]
    fn phone_number_resource_decodes_verification_status() {
        let body = r#"{
            "id":"idn_abc123",
            "phone_number":"+15551234567",
            "verification":{"status":"verified"}
        }"#;
        let resource: PhoneNumberResource = serde_json::from_str(body).unwrap();
        let verification = resource.verification.unwrap();
        assert_eq!(verification.status, VerificationStatus::Verified);
    }

    #[test]
    fn unknown_verification_status_is_tolerated() {
        let body = r#"{"status":"something_new"}"#;
        let verification: Verification = serde_json::from_str(body).unwrap();
        assert_eq!(verification.status, VerificationStatus::Unknown);
    }

    #[test]
    fn sign_in_outcome_without_token_is_incomplete() {
        let body = r#"{"status":"needs_first_factor"}"#;
        let outcome: SignInOutcome = serde_json::from_str(body).unwrap();
        assert_eq!(outcome.status, SignInStatus::NeedsFirstFactor);
        assert!(outcome.session_token.is_none());
    }
}
