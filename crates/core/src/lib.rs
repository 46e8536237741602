//! Aoeyaeng Core - Shared domain types.
//!
//! Types used by both the storefront server and the `ae-cli` tool:
//! - [`Email`] - validated, normalized member email address
//! - [`Price`] - decimal money amount with two-place display
//! - Typed IDs ([`MemberId`], [`ProductId`], [`CartItemId`])
//!
//! No I/O lives here. The `postgres` feature adds sqlx encode/decode
//! implementations so the types can be bound directly in queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
