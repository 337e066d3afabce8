//! Client for the identity provider's frontend API.
//!
//! The provider owns users, sessions, phone numbers and their verification
//! state; this crate only speaks its HTTP wire format. Phone-number
//! operations act on the signed-in user and therefore require the session
//! token issued by the sign-in flow.

pub mod error;
pub mod models;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::error;

pub use crate::error::{ClientError, ErrorList, ProviderError};
pub use crate::models::{
    DeletedResource, PhoneNumberResource, SignIn, SignInOutcome, SignInStatus, User, Verification,
    VerificationStatus,
};

/// Client configuration. The frontend API identifier is the only required
/// piece; `api_url` overrides the derived base URL for local development.
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    pub frontend_api: String,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(options: IdentityOptions) -> Self {
        let base_url = options
            .api_url
            .unwrap_or_else(|| format!("https://{}/v1", options.frontend_api));
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// The authenticated user behind the session token.
    pub async fn current_user(&self, session_token: &str) -> Result<User, ClientError> {
        let request = self
            .http
            .get(format!("{}/me", self.base_url))
            .bearer_auth(session_token);
        self.execute(request).await
    }

    /// The user's phone numbers, in provider order.
    pub async fn list_phone_numbers(
        &self,
        session_token: &str,
    ) -> Result<Vec<PhoneNumberResource>, ClientError> {
        let request = self
            .http
            .get(format!("{}/me/phone_numbers", self.base_url))
            .bearer_auth(session_token);
        self.execute(request).await
    }

    /// Create an unverified phone number on the user's account.
    pub async fn create_phone_number(
        &self,
        session_token: &str,
        phone_number: &str,
    ) -> Result<PhoneNumberResource, ClientError> {
        let request = self
            .http
            .post(format!("{}/me/phone_numbers", self.base_url))
            .bearer_auth(session_token)
            .form(&[("phone_number", phone_number)]);
        self.execute(request).await
    }

    /// Ask the provider to dispatch a one-time code to the number over SMS.
    pub async fn prepare_verification(
        &self,
        session_token: &str,
        phone_number_id: &str,
    ) -> Result<PhoneNumberResource, ClientError> {
        let request = self
            .http
            .post(format!(
                "{}/me/phone_numbers/{}/prepare_verification",
                self.base_url, phone_number_id
            ))
            .bearer_auth(session_token)
            .form(&[("strategy", "phone_code")]);
        self.execute(request).await
    }

    /// Check a one-time code against the pending verification.
    ///
    /// Invalid or expired codes come back as a provider error list; the
    /// returned resource carries the resulting verification status.
    pub async fn attempt_verification(
        &self,
        session_token: &str,
        phone_number_id: &str,
        code: &str,
    ) -> Result<PhoneNumberResource, ClientError> {
        let request = self
            .http
            .post(format!(
                "{}/me/phone_numbers/{}/attempt_verification",
                self.base_url, phone_number_id
            ))
            .bearer_auth(session_token)
            .form(&[("code", code)]);
        self.execute(request).await
    }

    /// Delete a phone number from the user's account.
    pub async fn destroy_phone_number(
        &self,
        session_token: &str,
        phone_number_id: &str,
    ) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(format!(
                "{}/me/phone_numbers/{}",
                self.base_url, phone_number_id
            ))
            .bearer_auth(session_token);
        let _ack: DeletedResource = self.execute(request).await?;
        Ok(())
    }

    /// Start a sign-in for a phone number or email identifier.
    pub async fn create_sign_in(&self, identifier: &str) -> Result<SignIn, ClientError> {
        let request = self
            .http
            .post(format!("{}/client/sign_ins", self.base_url))
            .form(&[("identifier", identifier)]);
        self.execute(request).await
    }

    /// Attempt the one-time-code factor of a sign-in.
    pub async fn attempt_sign_in(
        &self,
        sign_in_id: &str,
        code: &str,
    ) -> Result<SignInOutcome, ClientError> {
        let request = self
            .http
            .post(format!(
                "{}/client/sign_ins/{}/attempt_first_factor",
                self.base_url, sign_in_id
            ))
            .form(&[("strategy", "phone_code"), ("code", code)]);
        self.execute(request).await
    }

    /// Send a request and decode either the expected resource or the
    /// provider's error envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        match serde_json::from_slice::<ErrorList>(&body) {
            Ok(errors) if !errors.errors.is_empty() => {
                error!(%status, errors = ?errors.errors, "identity provider returned an error");
                Err(ClientError::Provider(errors))
            }
            _ => {
                error!(%status, "identity provider returned an undecodable error body");
                Err(ClientError::Unexpected(status))
            }
        }
    }
}
