//! Member domain types.

use chrono::{DateTime, NaiveDate, Utc};

use aoeyaeng_core::{Email, MemberId};

/// A registered shopper.
///
/// The password hash is deliberately not part of this type; it is only read
/// by [`crate::db::MemberRepository::get_credentials_by_email`].
#[derive(Debug, Clone)]
pub struct Member {
    pub id: MemberId,
    pub fullname: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    pub email: Email,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Validated registration data, ready to insert.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub fullname: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    pub email: Email,
    pub address: String,
}
