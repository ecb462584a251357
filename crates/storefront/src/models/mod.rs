//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row types.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{CartLine, CartLineView, CartSummary, NewCartLine};
pub use catalog::{Design, NewDesign, NewProduct, Product};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use user::CurrentUser;
