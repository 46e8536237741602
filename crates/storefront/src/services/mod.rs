//! Business logic services for the storefront.
//!
//! - `auth` - Member registration, login, password change and reset
//! - `email` - Transactional email over SMTP

pub mod auth;
pub mod email;

pub use auth::{AuthError, AuthService, Registration};
pub use email::{EmailError, EmailService};
