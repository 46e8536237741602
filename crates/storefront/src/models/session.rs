//! Session-related types.

use serde::{Deserialize, Serialize};

use aoeyaeng_core::{Email, MemberId};

use super::Member;

/// Session-stored member identity.
///
/// Presence of this value in the session is what "logged in" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMember {
    /// Member's database ID.
    pub id: MemberId,
    /// Member's email address.
    pub email: Email,
    /// Display name shown on the dashboard.
    pub fullname: String,
}

impl From<&Member> for CurrentMember {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            fullname: member.fullname.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in member.
    pub const CURRENT_MEMBER: &str = "current_member";
}
