//! Aoeyaeng Clothing storefront library.
//!
//! Member accounts, the product catalog and the cart, served as
//! server-rendered pages. The binary in `main.rs` wires this library to a
//! real database and SMTP relay; tests drive [`app::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
