//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Live cart lines (add/merge, update, remove, clear)
//! - `checkout` - Turning selected cart lines into an order
//! - `orders` - Order reads and status updates
//!
//! Services hold `Arc<dyn ...>` repositories from [`crate::db::Storage`] and are
//! cheap to clone into handlers.

mod cart;
mod checkout;
mod error;
mod orders;
mod serial;

#[cfg(test)]
mod testing;

pub use cart::{CartService, MAX_LINE_QUANTITY};
pub use checkout::OrderBuilder;
pub use error::{CommerceError, Entity};
pub use orders::OrderService;
pub use serial::SerialGenerator;
