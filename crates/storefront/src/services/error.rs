//! Commerce error types.

use std::fmt;

use thiserror::Error;

use crate::db::RepositoryError;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    Design,
    CartLine,
    Order,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::Design => "design",
            Self::CartLine => "cart line",
            Self::Order => "order",
        })
    }
}

/// Errors returned by the cart, checkout and order services.
///
/// The transport layer maps each variant to a status code; it never inspects
/// the message text.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The referenced entity does not exist (or is not visible to the caller).
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: String },

    /// A mutation referenced an entity owned by another user.
    #[error("{entity} {id} belongs to another user")]
    OwnershipViolation { entity: Entity, id: String },

    /// A read referenced an entity owned by another user.
    #[error("access to {entity} {id} denied")]
    AccessDenied { entity: Entity, id: String },

    /// The entity exists but cannot be used right now (e.g. inactive product).
    #[error("{entity} {id} is unavailable")]
    Unavailable { entity: Entity, id: String },

    /// Malformed input: empty selection, non-positive quantity, ...
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl CommerceError {
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn ownership_violation(entity: Entity, id: impl fmt::Display) -> Self {
        Self::OwnershipViolation {
            entity,
            id: id.to_string(),
        }
    }

    pub fn access_denied(entity: Entity, id: impl fmt::Display) -> Self {
        Self::AccessDenied {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unavailable(entity: Entity, id: impl fmt::Display) -> Self {
        Self::Unavailable {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}
