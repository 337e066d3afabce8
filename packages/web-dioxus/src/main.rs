//! Phone Verification - Dioxus Fullstack Web Application
//!
//! A small fullstack SSR application that lets a signed-in user add a phone
//! number to their account and verify it with a one-time code. All
//! authentication and phone-number state lives with the external identity
//! provider; this app is the form in front of it.
//!
//! ## Running
//!
//! Development (with hot reload):
//! ```bash
//! dx serve --features web,server
//! ```
//!
//! Production build:
//! ```bash
//! dx build --release --features web,server
//! ```

#![allow(non_snake_case)]

mod app;
mod auth;
mod components;
mod pages;
mod phone;
mod routes;
mod types;

fn main() {
    // Load .env on the server before anything reads configuration
    #[cfg(feature = "server")]
    {
        let _ = dotenvy::dotenv();
    }

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Launch the Dioxus app
    // In fullstack mode, this handles both server and client
    dioxus::launch(app::App);
}
