//! Application pages

mod home;
mod sign_in;

pub use home::*;
pub use sign_in::*;
