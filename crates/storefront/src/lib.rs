//! Kivu Imports storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the binary and the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod live;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod state;
pub mod views;
