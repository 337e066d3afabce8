//! Sign-in page
//!
//! Two-step sign-in against the identity provider: identifier first, then
//! the one-time code it dispatches.

use dioxus::prelude::*;

use crate::auth::{sign_in_start, sign_in_verify, use_auth};
use crate::routes::Route;

#[derive(Clone, PartialEq)]
enum SignInStep {
    Identifier,
    Code { sign_in_id: String },
}

/// Sign-in page
#[component]
pub fn SignIn() -> Element {
    let mut auth = use_auth();
    let navigator = use_navigator();

    let mut identifier = use_signal(String::new);
    let mut code = use_signal(String::new);
    let mut step = use_signal(|| SignInStep::Identifier);
    let mut error = use_signal(|| None::<String>);
    let mut is_pending = use_signal(|| false);

    // Redirect if already authenticated
    if auth.is_authenticated() {
        navigator.replace(Route::Home {});
        return rsx! {};
    }

    let handle_start = move |_| {
        let id = identifier().trim().to_string();
        if id.is_empty() {
            error.set(Some("Please enter your phone number or email".to_string()));
            return;
        }

        spawn(async move {
            is_pending.set(true);
            error.set(None);

            match sign_in_start(id).await {
                Ok(sign_in_id) => step.set(SignInStep::Code { sign_in_id }),
                Err(e) => error.set(Some(e.to_string())),
            }

            is_pending.set(false);
        });
    };

    let handle_verify = move |_| {
        let SignInStep::Code { sign_in_id } = step() else {
            return;
        };
        let c = code().trim().to_string();

        if c.is_empty() {
            error.set(Some("Please enter the verification code".to_string()));
            return;
        }

        spawn(async move {
            is_pending.set(true);
            error.set(None);

            match sign_in_verify(sign_in_id, c).await {
                Ok(true) => {
                    // Refresh auth state and redirect
                    auth.refresh().await;
                    navigator.push(Route::Home {});
                }
                Ok(false) => error.set(Some("Invalid verification code".to_string())),
                Err(e) => error.set(Some(e.to_string())),
            }

            is_pending.set(false);
        });
    };

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full",

                div {
                    class: "mb-6 text-center",
                    h1 { class: "text-2xl font-bold text-gray-900 mb-2", "Sign in" }
                    p { class: "text-gray-600 text-sm", "Phone Verification" }
                }

                if let Some(err) = error() {
                    div {
                        class: "mb-4 p-3 bg-red-50 border border-red-200 text-red-800 rounded text-sm",
                        "{err}"
                    }
                }

                match step() {
                    SignInStep::Identifier => rsx! {
                        form {
                            onsubmit: handle_start,
                            div {
                                class: "mb-4",
                                label {
                                    class: "block text-sm font-medium text-gray-700 mb-2",
                                    "Phone Number or Email"
                                }
                                input {
                                    r#type: "text",
                                    value: "{identifier}",
                                    oninput: move |e| identifier.set(e.value()),
                                    placeholder: "+1234567890 or you@example.com",
                                    class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-sky-500",
                                    disabled: is_pending()
                                }
                            }
                            button {
                                r#type: "submit",
                                class: "w-full bg-sky-700 text-white py-2 px-4 rounded-md hover:bg-sky-800 disabled:opacity-50 disabled:cursor-not-allowed",
                                disabled: is_pending(),
                                if is_pending() { "Sending..." } else { "Send Verification Code" }
                            }
                        }
                    },
                    SignInStep::Code { .. } => rsx! {
                        form {
                            onsubmit: handle_verify,
                            div {
                                class: "mb-4",
                                label {
                                    class: "block text-sm font-medium text-gray-700 mb-2",
                                    "Verification Code"
                                }
                                input {
                                    r#type: "text",
                                    value: "{code}",
                                    oninput: move |e| code.set(e.value()),
                                    placeholder: "Enter 6-digit code",
                                    class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-sky-500",
                                    disabled: is_pending()
                                }
                                p {
                                    class: "mt-1 text-xs text-gray-500",
                                    "Enter the verification code sent to {identifier}"
                                }
                            }
                            div {
                                class: "space-y-2",
                                button {
                                    r#type: "submit",
                                    class: "w-full bg-sky-700 text-white py-2 px-4 rounded-md hover:bg-sky-800 disabled:opacity-50 disabled:cursor-not-allowed",
                                    disabled: is_pending(),
                                    if is_pending() { "Verifying..." } else { "Verify & Sign In" }
                                }
                                button {
                                    r#type: "button",
                                    class: "w-full bg-stone-100 text-stone-700 py-2 px-4 rounded-md hover:bg-stone-200",
                                    onclick: move |_| {
                                        step.set(SignInStep::Identifier);
                                        code.set(String::new());
                                        error.set(None);
                                    },
                                    "Back"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
