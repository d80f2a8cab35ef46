//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Everything here serializes to the JSON returned by the
//! HTTP handlers.

pub mod address;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod newsletter;
pub mod order;
pub mod review;
pub mod session;
pub mod user;
pub mod wishlist;

pub use address::{Address, AddressInput};
pub use cart::{CartLine, CartView};
pub use catalog::{
    Category, CategoryFilter, ParentFilter, Product, ProductDetail, ProductImage, ProductListing,
    ProductQuery, ProductSort, ProductVariant, VariantOption,
};
pub use coupon::Coupon;
pub use newsletter::SubscribeOutcome;
pub use order::{Order, OrderItem, OrderWithItems};
pub use review::{Review, ReviewQuery, ReviewSort};
pub use session::{CurrentUser, session_keys};
pub use user::{Preferences, ProfileUpdate, User};
pub use wishlist::WishlistEntry;
