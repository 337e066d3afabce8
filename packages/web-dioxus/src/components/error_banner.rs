//! Error banner for provider failures

use dioxus::prelude::*;

use crate::phone::FormError;

/// Banner showing a provider error verbatim. Codes are never interpreted;
/// the serialized object is shown for diagnostics.
#[component]
pub fn ErrorBanner(error: FormError) -> Element {
    let serialized = serde_json::to_string(&error).unwrap_or_default();

    rsx! {
        div {
            class: "mb-4 p-3 bg-red-50 border border-red-200 text-red-800 rounded text-sm",
            p { "An error occurred:" }
            pre {
                class: "mt-2 text-xs overflow-x-auto",
                "{serialized}"
            }
        }
    }
}
