//! Phone number verification: form state machine and server functions

mod form;
pub mod server_fns;

pub use form::*;
