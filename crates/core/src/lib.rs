//! Kivu Imports Core - Shared domain types and storefront rules.
//!
//! This crate provides the types used across all Kivu Imports components:
//! - `storefront` - Public-facing e-commerce site
//! - `cli` - Command-line tools for migrations and content checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. The storefront binary owns every network call and
//! hands the results to these types for arithmetic and filtering.
//!
//! # Modules
//!
//! - [`types`] - Entities mirrored from the backend (products, carts, orders,
//!   notifications, returns, users) plus ids, prices and emails
//! - [`widgets`] - State rules behind interactive widgets (recent searches,
//!   flash-sale countdown, carousel)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod widgets;

pub use types::*;
pub use widgets::*;
