//! Phone verification form page

use dioxus::prelude::*;

use crate::auth::{logout, use_auth};
use crate::components::{ErrorBanner, LoadingSpinner};
use crate::phone::{FormStep, PhoneForm, PhoneNumberService, ServerFnService};
use crate::routes::Route;

/// The three-step phone verification form plus the user's existing phone
/// numbers. Only reachable signed-in; visitors are sent to the sign-in page.
#[component]
pub fn Home() -> Element {
    let mut auth = use_auth();
    let navigator = use_navigator();

    let mut form = use_signal(PhoneForm::new);
    let mut is_pending = use_signal(|| false);
    let mut phone_numbers =
        use_resource(move || async move { ServerFnService.list_phone_numbers().await });

    if *auth.loading.read() {
        return rsx! {
            div {
                class: "min-h-screen flex items-center justify-center",
                LoadingSpinner {}
            }
        };
    }

    if !auth.is_authenticated() {
        navigator.replace(Route::SignIn {});
        return rsx! {};
    }

    let handle_add = move |_: FormEvent| {
        if is_pending() {
            return;
        }
        spawn(async move {
            is_pending.set(true);
            let mut next = form();
            next.submit_phone_number(&ServerFnService).await;
            form.set(next);
            phone_numbers.restart();
            is_pending.set(false);
        });
    };

    let handle_verify = move |_: FormEvent| {
        if is_pending() {
            return;
        }
        spawn(async move {
            is_pending.set(true);
            let mut next = form();
            next.submit_code(&ServerFnService).await;
            form.set(next);
            phone_numbers.restart();
            is_pending.set(false);
        });
    };

    let handle_reset = move |_| {
        form.write().reset();
    };

    let handle_delete_all = move |_| {
        if is_pending() {
            return;
        }
        let numbers = phone_numbers()
            .and_then(|result| result.ok())
            .unwrap_or_default();
        if numbers.is_empty() {
            return;
        }
        spawn(async move {
            is_pending.set(true);
            let mut next = form();
            next.delete_all(&ServerFnService, &numbers).await;
            form.set(next);
            phone_numbers.restart();
            is_pending.set(false);
        });
    };

    let handle_sign_out = move |_| {
        spawn(async move {
            let _ = logout().await;
            auth.clear();
        });
    };

    let snapshot = form();
    let phone_value = snapshot.fields().phone_number.clone();
    let otp_value = snapshot.fields().otp.clone();
    let listed = phone_numbers()
        .and_then(|result| result.ok())
        .unwrap_or_default();
    let identifier = auth
        .user
        .read()
        .as_ref()
        .map(|user| user.identifier.clone())
        .unwrap_or_default();

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full",

                div {
                    class: "mb-6 flex items-center justify-between",
                    p { class: "text-sm text-gray-600", "Signed in as {identifier}" }
                    button {
                        class: "text-sm text-sky-700 hover:underline",
                        onclick: handle_sign_out,
                        "Sign out"
                    }
                }

                if let Some(error) = snapshot.error() {
                    ErrorBanner { error: error.clone() }
                }

                match snapshot.step() {
                    FormStep::Add => rsx! {
                        h1 { class: "text-2xl font-bold text-gray-900 mb-4", "Step 1 - Enter your phone number" }
                        form {
                            onsubmit: handle_add,
                            div {
                                class: "mb-4",
                                label {
                                    class: "block text-sm font-medium text-gray-700 mb-2",
                                    r#for: "phoneNumber",
                                    "Phone number"
                                }
                                input {
                                    r#type: "tel",
                                    id: "phoneNumber",
                                    name: "phoneNumber",
                                    value: "{phone_value}",
                                    oninput: move |e| form.write().set_phone_number(e.value()),
                                    placeholder: "+15551234567",
                                    class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-sky-500",
                                    disabled: is_pending()
                                }
                            }
                            button {
                                r#type: "submit",
                                class: "w-full bg-sky-700 text-white py-2 px-4 rounded-md hover:bg-sky-800 disabled:opacity-50 disabled:cursor-not-allowed",
                                disabled: is_pending(),
                                if is_pending() { "Submitting..." } else { "Submit" }
                            }
                        }
                    },
                    FormStep::Verify => rsx! {
                        h1 { class: "text-2xl font-bold text-gray-900 mb-4", "Step 2 - Verify phone" }
                        form {
                            onsubmit: handle_verify,
                            div {
                                class: "mb-4",
                                label {
                                    class: "block text-sm font-medium text-gray-700 mb-2",
                                    r#for: "otp",
                                    "OTP"
                                }
                                input {
                                    r#type: "text",
                                    id: "otp",
                                    name: "otp",
                                    pattern: "[0-9]{{6}}",
                                    value: "{otp_value}",
                                    oninput: move |e| form.write().set_otp(e.value()),
                                    placeholder: "Enter 6-digit code",
                                    class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-sky-500",
                                    disabled: is_pending()
                                }
                            }
                            button {
                                r#type: "submit",
                                class: "w-full bg-sky-700 text-white py-2 px-4 rounded-md hover:bg-sky-800 disabled:opacity-50 disabled:cursor-not-allowed",
                                disabled: is_pending(),
                                if is_pending() { "Verifying..." } else { "Submit" }
                            }
                        }
                    },
                    FormStep::Success => rsx! {
                        h1 { class: "text-2xl font-bold text-gray-900 mb-4", "Success!" }
                        button {
                            class: "w-full bg-sky-700 text-white py-2 px-4 rounded-md hover:bg-sky-800",
                            onclick: handle_reset,
                            "Add phone"
                        }
                    }
                }

                div {
                    class: "mt-8 pt-6 border-t border-gray-200",
                    h2 { class: "text-lg font-semibold text-gray-900 mb-3", "User phone numbers:" }

                    if listed.is_empty() {
                        p { class: "text-sm text-gray-500 mb-4", "No phone numbers yet." }
                    } else {
                        ul {
                            class: "mb-4 space-y-1",
                            for number in listed.iter() {
                                li {
                                    key: "{number.id}",
                                    class: "text-sm text-gray-700 flex justify-between",
                                    span { "{number.phone_number}" }
                                    span {
                                        class: "text-xs text-gray-400",
                                        {number.status.label()}
                                    }
                                }
                            }
                        }
                    }

                    button {
                        class: "w-full bg-stone-100 text-stone-700 py-2 px-4 rounded-md hover:bg-stone-200 disabled:opacity-50 disabled:cursor-not-allowed",
                        onclick: handle_delete_all,
                        disabled: listed.is_empty() || is_pending(),
                        "Delete all phone numbers"
                    }
                }
            }
        }
    }
}
