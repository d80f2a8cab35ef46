//! Core types for AbaMade.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod coupon;
pub mod email;
pub mod id;
pub mod pricing;
pub mod rating;
pub mod slug;
pub mod status;

pub use cart::CartOwner;
pub use coupon::{CouponError, CouponRules, DiscountType};
pub use email::{Email, EmailError};
pub use id::*;
pub use pricing::{CartTotals, PricedLine, PricingPolicy, effective_unit_price, round_cents};
pub use rating::{Rating, RatingError, RatingSummary};
pub use slug::{Slug, SlugError};
pub use status::*;
