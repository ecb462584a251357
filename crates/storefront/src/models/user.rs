//! Request identity.

use serde::{Deserialize, Serialize};

use tee_studio_core::UserId;

/// The authenticated actor performing a request.
///
/// Authentication happens upstream; the storefront only receives the
/// resulting user ID and treats it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
}
