//! Domain models for the storefront.
//!
//! These are validated domain types, separate from the `FromRow` structs in
//! [`crate::db`].

pub mod cart;
pub mod member;
pub mod product;
pub mod session;

pub use cart::{CartLine, CartSummary};
pub use member::{Member, NewMember};
pub use product::{CategoryFilter, NewProduct, Product};
pub use session::{CurrentMember, keys as session_keys};
