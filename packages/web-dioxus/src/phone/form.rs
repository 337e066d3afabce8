//! Phone verification form state machine
//!
//! The form walks through three steps: add a phone number, verify it with a
//! one-time code, done. Every provider interaction goes through the
//! [`PhoneNumberService`] trait so the machine can be driven by server
//! functions in the app and by scripted mocks in tests.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// The step the form is currently showing. Progression is linear; the only
/// way back is a full [`PhoneForm::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStep {
    #[default]
    Add,
    Verify,
    Success,
}

/// User-editable input fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub phone_number: String,
    pub otp: String,
}

/// A provider error as shown to the user. Codes are displayed verbatim and
/// never branched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct FormError {
    pub code: String,
    pub message: String,
}

impl FormError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Opaque handle to the phone number created in the Add step, mid
/// verification. Held by the form for one add/verify cycle and discarded on
/// reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPhoneNumber {
    pub id: String,
    pub phone_number: String,
}

/// Verification state reported by the provider after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    Unverified,
    Failed,
    Expired,
}

impl VerificationOutcome {
    /// Short status label for display
    pub fn label(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::Unverified => "unverified",
            VerificationOutcome::Failed => "failed",
            VerificationOutcome::Expired => "expired",
        }
    }
}

/// A phone number already on the user's account, for the read-only list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumberEntry {
    pub id: String,
    pub phone_number: String,
    pub status: VerificationOutcome,
}

/// Provider operations the form depends on.
///
/// `?Send` because the production impl runs on the browser side of the
/// fullstack split, where futures are not `Send`.
#[async_trait(?Send)]
pub trait PhoneNumberService {
    async fn create_phone_number(&self, number: &str) -> Result<PendingPhoneNumber, FormError>;
    async fn prepare_verification(&self, phone_number_id: &str) -> Result<(), FormError>;
    async fn attempt_verification(
        &self,
        phone_number_id: &str,
        code: &str,
    ) -> Result<VerificationOutcome, FormError>;
    async fn destroy_phone_number(&self, phone_number_id: &str) -> Result<(), FormError>;
    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberEntry>, FormError>;
}

/// The form state machine.
///
/// Invariant: a pending handle exists exactly while the step is Verify or
/// Success; on Add there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneForm {
    step: FormStep,
    fields: FormFields,
    error: Option<FormError>,
    pending: Option<PendingPhoneNumber>,
}

impl PhoneForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingPhoneNumber> {
        self.pending.as_ref()
    }

    pub fn set_phone_number(&mut self, value: String) {
        self.fields.phone_number = value;
    }

    pub fn set_otp(&mut self, value: String) {
        self.fields.otp = value;
    }

    /// True for exactly six ASCII digits, mirroring the `[0-9]{6}` input
    /// pattern the browser enforces on the OTP field.
    pub fn otp_is_well_formed(otp: &str) -> bool {
        otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit())
    }

    /// Clear fields, error and the pending handle; back to the Add step.
    pub fn reset(&mut self) {
        self.error = None;
        self.pending = None;
        self.fields = FormFields::default();
        self.step = FormStep::Add;
        debug_assert!(self.invariant_holds());
    }

    /// Add step submission: create the phone number on the provider and, on
    /// success, advance to Verify and run its entry action.
    pub async fn submit_phone_number<S: PhoneNumberService>(&mut self, service: &S) {
        self.error = None;

        let number = self.fields.phone_number.trim().to_string();
        if number.is_empty() {
            self.error = Some(FormError::new(
                "form_param_missing",
                "Enter a phone number",
            ));
            return;
        }

        match service.create_phone_number(&number).await {
            Ok(pending) => {
                info!(phone_number_id = %pending.id, "phone number created");
                self.pending = Some(pending);
                self.step = FormStep::Verify;
                self.enter_verify(service).await;
            }
            Err(err) => {
                error!(code = %err.code, message = %err.message, "failed to create phone number");
                self.error = Some(err);
            }
        }
        debug_assert!(self.invariant_holds());
    }

    /// Entry action of the Verify step: ask the provider to dispatch the
    /// one-time code. Fire and forget; failures are logged, never surfaced,
    /// and a missing handle makes this a no-op.
    async fn enter_verify<S: PhoneNumberService>(&mut self, service: &S) {
        let Some(pending) = &self.pending else {
            return;
        };
        if let Err(err) = service.prepare_verification(&pending.id).await {
            warn!(code = %err.code, "failed to request one-time code dispatch");
        }
    }

    /// Verify step submission: check the code with the provider and advance
    /// to Success only when the number comes back verified.
    pub async fn submit_code<S: PhoneNumberService>(&mut self, service: &S) {
        self.error = None;

        let Some(pending) = self.pending.clone() else {
            return;
        };

        let otp = self.fields.otp.trim().to_string();
        if !Self::otp_is_well_formed(&otp) {
            // The browser pattern already blocks these; never hit the provider
            return;
        }

        match service.attempt_verification(&pending.id, &otp).await {
            Ok(VerificationOutcome::Verified) => {
                info!(phone_number_id = %pending.id, "phone number verified");
                self.step = FormStep::Success;
            }
            Ok(outcome) => {
                warn!(?outcome, "verification attempt accepted but number not verified");
                self.error = Some(FormError::new(
                    "verification_incomplete",
                    "The number is not verified yet. Request a new code and try again.",
                ));
            }
            Err(err) => {
                error!(code = %err.code, message = %err.message, "verification attempt failed");
                self.error = Some(err);
            }
        }
        debug_assert!(self.invariant_holds());
    }

    /// Delete every listed phone number concurrently, then reset the form.
    ///
    /// The reset only happens when all deletions succeed; otherwise the form
    /// stays where it is and reports how many deletions failed.
    pub async fn delete_all<S: PhoneNumberService>(
        &mut self,
        service: &S,
        numbers: &[PhoneNumberEntry],
    ) {
        self.error = None;

        if numbers.is_empty() {
            return;
        }

        let results = join_all(
            numbers
                .iter()
                .map(|entry| service.destroy_phone_number(&entry.id)),
        )
        .await;

        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed == 0 {
            info!(count = numbers.len(), "user phone numbers deleted");
            self.reset();
        } else {
            for err in results.iter().filter_map(|result| result.as_ref().err()) {
                error!(code = %err.code, message = %err.message, "failed to delete phone number");
            }
            self.error = Some(FormError::new(
                "phone_number_delete_failed",
                format!(
                    "{failed} of {} phone numbers could not be deleted",
                    numbers.len()
                ),
            ));
        }
        debug_assert!(self.invariant_holds());
    }

    fn invariant_holds(&self) -> bool {
        self.pending.is_some() == !matches!(self.step, FormStep::Add)
    }
}

/// Production [`PhoneNumberService`] backed by the app's server functions.
#[derive(Clone, Copy, Default)]
pub struct ServerFnService;

#[async_trait(?Send)]
impl PhoneNumberService for ServerFnService {
    async fn create_phone_number(&self, number: &str) -> Result<PendingPhoneNumber, FormError> {
        super::server_fns::create_phone_number(number.to_string())
            .await
            .map_err(form_error_from_server)
    }

    async fn prepare_verification(&self, phone_number_id: &str) -> Result<(), FormError> {
        super::server_fns::prepare_verification(phone_number_id.to_string())
            .await
            .map_err(form_error_from_server)
    }

    async fn attempt_verification(
        &self,
        phone_number_id: &str,
        code: &str,
    ) -> Result<VerificationOutcome, FormError> {
        super::server_fns::attempt_verification(phone_number_id.to_string(), code.to_string())
            .await
            .map_err(form_error_from_server)
    }

    async fn destroy_phone_number(&self, phone_number_id: &str) -> Result<(), FormError> {
        super::server_fns::destroy_phone_number(phone_number_id.to_string())
            .await
            .map_err(form_error_from_server)
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberEntry>, FormError> {
        super::server_fns::list_phone_numbers()
            .await
            .map_err(form_error_from_server)
    }
}

/// Restore the structured `{code, message}` the server functions embed in
/// the `ServerFnError` message; anything unparseable degrades to a generic
/// `request_failed` error.
fn form_error_from_server(err: dioxus::prelude::ServerFnError) -> FormError {
    let message = err.to_string();
    if let Some(start) = message.find('{') {
        if let Ok(parsed) = serde_json::from_str::<FormError>(&message[start..]) {
            return parsed;
        }
    }
    FormError::new("request_failed", message)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Scripted mock: queued per-call results, recorded call arguments.
    #[derive(Default)]
    struct MockPhoneService {
        create_results: Mutex<Vec<Result<PendingPhoneNumber, FormError>>>,
        prepare_results: Mutex<Vec<Result<(), FormError>>>,
        attempt_results: Mutex<Vec<Result<VerificationOutcome, FormError>>>,
        destroy_results: Mutex<Vec<Result<(), FormError>>>,
        create_calls: Mutex<Vec<String>>,
        prepare_calls: Mutex<Vec<String>>,
        attempt_calls: Mutex<Vec<(String, String)>>,
        destroy_calls: Mutex<Vec<String>>,
    }

    impl MockPhoneService {
        fn new() -> Self {
            Self::default()
        }

        fn with_create_ok(self, id: &str, number: &str) -> Self {
            self.create_results.lock().unwrap().push(Ok(PendingPhoneNumber {
                id: id.to_string(),
                phone_number: number.to_string(),
            }));
            self
        }

        fn with_create_err(self, code: &str, message: &str) -> Self {
            self.create_results
                .lock()
                .unwrap()
                .push(Err(FormError::new(code, message)));
            self
        }

        fn with_attempt_ok(self, outcome: VerificationOutcome) -> Self {
            self.attempt_results.lock().unwrap().push(Ok(outcome));
            self
        }

        fn with_attempt_err(self, code: &str, message: &str) -> Self {
            self.attempt_results
                .lock()
                .unwrap()
                .push(Err(FormError::new(code, message)));
            self
        }

        fn with_destroy_ok(self) -> Self {
            self.destroy_results.lock().unwrap().push(Ok(()));
            self
        }

        fn with_destroy_err(self, code: &str, message: &str) -> Self {
            self.destroy_results
                .lock()
                .unwrap()
                .push(Err(FormError::new(code, message)));
            self
        }

        fn create_calls(&self) -> Vec<String> {
            self.create_calls.lock().unwrap().clone()
        }

        fn prepare_calls(&self) -> Vec<String> {
            self.prepare_calls.lock().unwrap().clone()
        }

        fn attempt_calls(&self) -> Vec<(String, String)> {
            self.attempt_calls.lock().unwrap().clone()
        }

        fn destroy_calls(&self) -> Vec<String> {
            self.destroy_calls.lock().unwrap().clone()
        }
    }

    #[async_trait(?Send)]
    impl PhoneNumberService for MockPhoneService {
        async fn create_phone_number(
            &self,
            number: &str,
        ) -> Result<PendingPhoneNumber, FormError> {
            self.create_calls.lock().unwrap().push(number.to_string());
            let mut results = self.create_results.lock().unwrap();
            if results.is_empty() {
                Ok(PendingPhoneNumber {
                    id: "idn_default".to_string(),
                    phone_number: number.to_string(),
                })
            } else {
                results.remove(0)
            }
        }

        async fn prepare_verification(&self, phone_number_id: &str) -> Result<(), FormError> {
            self.prepare_calls
                .lock()
                .unwrap()
                .push(phone_number_id.to_string());
            let mut results = self.prepare_results.lock().unwrap();
            if results.is_empty() {
                Ok(())
            } else {
                results.remove(0)
            }
        }

        async fn attempt_verification(
            &self,
            phone_number_id: &str,
            code: &str,
        ) -> Result<VerificationOutcome, FormError> {
            self.attempt_calls
                .lock()
                .unwrap()
                .push((phone_number_id.to_string(), code.to_string()));
            let mut results = self.attempt_results.lock().unwrap();
            if results.is_empty() {
                Ok(VerificationOutcome::Verified)
            } else {
                results.remove(0)
            }
        }

        async fn destroy_phone_number(&self, phone_number_id: &str) -> Result<(), FormError> {
            self.destroy_calls
                .lock()
                .unwrap()
                .push(phone_number_id.to_string());
            let mut results = self.destroy_results.lock().unwrap();
            if results.is_empty() {
                Ok(())
            } else {
                results.remove(0)
            }
        }

        async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumberEntry>, FormError> {
            Ok(Vec::new())
        }
    }

    fn entry(id: &str, number: &str) -> PhoneNumberEntry {
        PhoneNumberEntry {
            id: id.to_string(),
            phone_number: number.to_string(),
            status: VerificationOutcome::Verified,
        }
    }

    #[tokio::test]
    async fn submitting_a_phone_number_advances_and_prepares_once() {
        let service = MockPhoneService::new().with_create_ok("idn_1", "+15551234567");
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());

        form.submit_phone_number(&service).await;

        assert_eq!(form.step(), FormStep::Verify);
        assert!(form.error().is_none());
        assert_eq!(form.pending().unwrap().id, "idn_1");
        assert_eq!(service.create_calls(), vec!["+15551234567"]);
        assert_eq!(service.prepare_calls(), vec!["idn_1"]);
    }

    #[tokio::test]
    async fn empty_phone_number_never_reaches_the_provider() {
        let service = MockPhoneService::new();
        let mut form = PhoneForm::new();
        form.set_phone_number("   ".to_string());

        form.submit_phone_number(&service).await;

        assert_eq!(form.step(), FormStep::Add);
        assert_eq!(form.error().unwrap().code, "form_param_missing");
        assert!(service.create_calls().is_empty());
    }

    #[tokio::test]
    async fn create_failure_surfaces_the_primary_error_and_stays_on_add() {
        let service = MockPhoneService::new()
            .with_create_err("form_param_invalid", "Invalid phone number");
        let mut form = PhoneForm::new();
        form.set_phone_number("not-a-number".to_string());

        form.submit_phone_number(&service).await;

        assert_eq!(form.step(), FormStep::Add);
        assert!(form.pending().is_none());
        let error = form.error().unwrap();
        assert_eq!(error.code, "form_param_invalid");
        assert_eq!(error.message, "Invalid phone number");
        assert!(service.prepare_calls().is_empty());
    }

    #[tokio::test]
    async fn prepare_failure_is_swallowed() {
        let service = MockPhoneService::new().with_create_ok("idn_1", "+15551234567");
        service
            .prepare_results
            .lock()
            .unwrap()
            .push(Err(FormError::new("sms_failed", "Could not send SMS")));
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());

        form.submit_phone_number(&service).await;

        // The entry action failed but the transition stands and no error shows
        assert_eq!(form.step(), FormStep::Verify);
        assert!(form.error().is_none());
    }

    #[tokio::test]
    async fn malformed_otp_never_reaches_the_provider() {
        let service = MockPhoneService::new().with_create_ok("idn_1", "+15551234567");
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;

        for bad in ["", "12345", "1234567", "12345a", "abcdef"] {
            form.set_otp(bad.to_string());
            form.submit_code(&service).await;
            assert_eq!(form.step(), FormStep::Verify, "otp {bad:?} must not advance");
        }

        assert!(service.attempt_calls().is_empty());
    }

    #[tokio::test]
    async fn verified_outcome_advances_to_success() {
        let service = MockPhoneService::new()
            .with_create_ok("idn_1", "+15551234567")
            .with_attempt_ok(VerificationOutcome::Verified);
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;

        form.set_otp("123456".to_string());
        form.submit_code(&service).await;

        assert_eq!(form.step(), FormStep::Success);
        assert!(form.error().is_none());
        assert_eq!(
            service.attempt_calls(),
            vec![("idn_1".to_string(), "123456".to_string())]
        );
        // The handle is retained through Success, only reset discards it
        assert!(form.pending().is_some());
    }

    #[tokio::test]
    async fn unverified_outcome_stays_on_verify_with_an_error() {
        let service = MockPhoneService::new()
            .with_create_ok("idn_1", "+15551234567")
            .with_attempt_ok(VerificationOutcome::Unverified);
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;

        form.set_otp("123456".to_string());
        form.submit_code(&service).await;

        assert_eq!(form.step(), FormStep::Verify);
        assert_eq!(form.error().unwrap().code, "verification_incomplete");
    }

    #[tokio::test]
    async fn rejected_code_surfaces_the_provider_error() {
        let service = MockPhoneService::new()
            .with_create_ok("idn_1", "+15551234567")
            .with_attempt_err("form_code_incorrect", "Incorrect code");
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;

        form.set_otp("000000".to_string());
        form.submit_code(&service).await;

        assert_eq!(form.step(), FormStep::Verify);
        let error = form.error().unwrap();
        assert_eq!(error.code, "form_code_incorrect");
        assert_eq!(error.message, "Incorrect code");
    }

    #[tokio::test]
    async fn submit_code_without_a_pending_handle_is_a_noop() {
        let service = MockPhoneService::new();
        let mut form = PhoneForm::new();
        form.set_otp("123456".to_string());

        form.submit_code(&service).await;

        assert_eq!(form.step(), FormStep::Add);
        assert!(service.attempt_calls().is_empty());
    }

    #[tokio::test]
    async fn a_new_attempt_clears_the_previous_error() {
        let service = MockPhoneService::new()
            .with_create_err("form_param_invalid", "Invalid phone number")
            .with_create_ok("idn_1", "+15551234567");
        let mut form = PhoneForm::new();
        form.set_phone_number("bad".to_string());
        form.submit_phone_number(&service).await;
        assert!(form.error().is_some());

        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;

        assert!(form.error().is_none());
        assert_eq!(form.step(), FormStep::Verify);
    }

    #[tokio::test]
    async fn reset_restores_the_initial_state() {
        let service = MockPhoneService::new()
            .with_create_ok("idn_1", "+15551234567")
            .with_attempt_ok(VerificationOutcome::Verified);
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        form.submit_phone_number(&service).await;
        form.set_otp("123456".to_string());
        form.submit_code(&service).await;
        assert_eq!(form.step(), FormStep::Success);

        form.reset();

        assert_eq!(form, PhoneForm::new());
    }

    #[tokio::test]
    async fn delete_all_issues_one_destroy_per_number_and_resets() {
        let service = MockPhoneService::new()
            .with_destroy_ok()
            .with_destroy_ok()
            .with_destroy_ok();
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        let numbers = vec![
            entry("idn_1", "+15551230001"),
            entry("idn_2", "+15551230002"),
            entry("idn_3", "+15551230003"),
        ];

        form.delete_all(&service, &numbers).await;

        assert_eq!(service.destroy_calls(), vec!["idn_1", "idn_2", "idn_3"]);
        assert_eq!(form, PhoneForm::new());
    }

    #[tokio::test]
    async fn delete_all_with_no_numbers_does_nothing() {
        let service = MockPhoneService::new();
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        let before = form.clone();

        form.delete_all(&service, &[]).await;

        assert!(service.destroy_calls().is_empty());
        assert_eq!(form, before);
    }

    #[tokio::test]
    async fn partial_delete_failure_skips_the_reset_and_reports() {
        let service = MockPhoneService::new()
            .with_destroy_ok()
            .with_destroy_err("resource_locked", "Cannot delete a reserved number");
        let mut form = PhoneForm::new();
        form.set_phone_number("+15551234567".to_string());
        let numbers = vec![entry("idn_1", "+15551230001"), entry("idn_2", "+15551230002")];

        form.delete_all(&service, &numbers).await;

        assert_eq!(service.destroy_calls().len(), 2);
        let error = form.error().unwrap();
        assert_eq!(error.code, "phone_number_delete_failed");
        assert!(error.message.contains("1 of 2"));
        // Fields survive because the reset was skipped
        assert_eq!(form.fields().phone_number, "+15551234567");
    }

    #[test]
    fn otp_pattern_matches_exactly_six_digits() {
        assert!(PhoneForm::otp_is_well_formed("123456"));
        assert!(PhoneForm::otp_is_well_formed("000000"));
        assert!(!PhoneForm::otp_is_well_formed("12345"));
        assert!(!PhoneForm::otp_is_well_formed("1234567"));
        assert!(!PhoneForm::otp_is_well_formed("12345x"));
        assert!(!PhoneForm::otp_is_well_formed("１２３４５６"));
    }
}
