//! AbaMade Core - Shared domain types for the storefront.
//!
//! This crate provides the types used by every AbaMade component:
//! - `storefront` - Public shop API, account area and admin back-office
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Cart totals, coupon discounts and rating summaries are
//! computed here so the storefront and the tests agree on the arithmetic.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, slugs, statuses, ratings, pricing and coupons

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
