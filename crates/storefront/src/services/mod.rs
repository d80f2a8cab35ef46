//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password registration, login and password changes
//! - `cart` - Cart mutations with catalog validation
//! - `catalog` - Cached catalog reads with a built-in fallback
//! - `checkout` - Cart to order in one transaction
//! - `newsletter` - Subscribe/unsubscribe

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod newsletter;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService};
pub use newsletter::{NewsletterError, NewsletterService};
