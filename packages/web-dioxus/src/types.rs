//! Shared type definitions

use serde::{Deserialize, Serialize};

/// The authenticated user, as stored in the server-side session after a
/// completed sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-assigned user id
    pub user_id: String,
    /// Identifier the user signed in with (phone number or email)
    pub identifier: String,
}
