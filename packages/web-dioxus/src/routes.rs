//! Route definitions for the application

use dioxus::prelude::*;

use crate::pages::{Home, SignIn};

/// All application routes
#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[route("/")]
    Home {},

    #[route("/sign-in")]
    SignIn {},
}
