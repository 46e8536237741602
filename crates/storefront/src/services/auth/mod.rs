//! Authentication service.
//!
//! Email + password accounts. Passwords are hashed with Argon2id and stored
//! as PHC strings in `storefront.member.password_hash`.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::NaiveDate;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use aoeyaeng_core::{Email, MemberId};

use crate::db::{MemberRepository, RepositoryError};
use crate::models::{Member, NewMember};
use crate::services::email::EmailService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of a generated temporary password.
const TEMPORARY_PASSWORD_LENGTH: usize = 8;

/// Alphabet for temporary passwords (lowercase base 36).
const TEMPORARY_PASSWORD_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Raw registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub fullname: String,
    /// `YYYY-MM-DD` as sent by `<input type="date">`; blank means not given.
    pub dob: String,
    pub phone: String,
    pub email: String,
    pub password: SecretString,
    pub address: String,
}

impl Registration {
    /// Validate and normalize everything except the password.
    fn validate(&self) -> Result<NewMember, AuthError> {
        let fullname = self.fullname.trim();
        if fullname.is_empty() {
            return Err(AuthError::InvalidField(
                "Please enter your full name.".to_string(),
            ));
        }

        let dob = parse_dob(&self.dob)?;
        let email = Email::parse(&self.email)?;

        Ok(NewMember {
            fullname: fullname.to_string(),
            dob,
            phone: self.phone.trim().to_string(),
            email,
            address: self.address.trim().to_string(),
        })
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    members: MemberRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            members: MemberRepository::new(pool),
        }
    }

    /// Register a new member.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidField`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` if the input fails validation.
    /// Returns `AuthError::EmailInUse` if the email is already registered.
    pub async fn register(&self, registration: &Registration) -> Result<Member, AuthError> {
        let new_member = registration.validate()?;
        let password = registration.password.expose_secret();
        validate_password(password)?;

        if self.members.get_by_email(&new_member.email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        let password_hash = hash_password(password)?;

        // The unique index still catches a registration racing this one.
        self.members
            .create(&new_member, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailInUse,
                other => AuthError::Repository(other),
            })
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailNotFound` if no member has this email (or it
    /// isn't an email at all), and `AuthError::IncorrectPassword` if the
    /// password doesn't match.
    pub async fn login(&self, email: &str, password: &str) -> Result<Member, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::EmailNotFound)?;

        let (member, password_hash) = self
            .members
            .get_credentials_by_email(&email)
            .await?
            .ok_or(AuthError::EmailNotFound)?;

        verify_password(password, &password_hash)?;

        Ok(member)
    }

    /// Change a logged-in member's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectPassword` if `current` is wrong and
    /// `AuthError::WeakPassword` if `new` fails validation.
    pub async fn change_password(
        &self,
        member_id: MemberId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self.members.get_password_hash(member_id).await?;
        verify_password(current, &password_hash)?;

        validate_password(new)?;
        let new_hash = hash_password(new)?;

        self.members.update_password(member_id, &new_hash).await?;
        tracing::info!(member_id = %member_id, "Password changed");
        Ok(())
    }

    /// Replace a member's password with a generated one and email it to them.
    ///
    /// The new hash is written inside a transaction that commits only after
    /// SMTP accepts the message, so a failed send leaves the old password
    /// working.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailNotFound` if no member has this email and
    /// `AuthError::Email` if the message can't be delivered.
    pub async fn reset_password(&self, email: &str, mailer: &EmailService) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::EmailNotFound)?;

        let temporary = generate_temporary_password();
        let password_hash = hash_password(temporary.expose_secret())?;

        let mut tx = self.members.begin().await?;
        MemberRepository::update_password_by_email_in(&mut tx, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::EmailNotFound,
                other => AuthError::Repository(other),
            })?;

        // Dropping `tx` on error rolls the update back.
        mailer
            .send_temporary_password(email.as_str(), &temporary)
            .await?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(email = %email, "Temporary password issued");
        Ok(())
    }
}

/// Generate an 8-character lowercase alphanumeric password.
#[must_use]
pub fn generate_temporary_password() -> SecretString {
    let mut rng = rand::rng();
    let password: String = (0..TEMPORARY_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..TEMPORARY_PASSWORD_ALPHABET.len());
            char::from(TEMPORARY_PASSWORD_ALPHABET.get(idx).copied().unwrap_or(b'a'))
        })
        .collect();
    SecretString::from(password)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Parse the optional date of birth field.
fn parse_dob(raw: &str) -> Result<Option<NaiveDate>, AuthError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let dob = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AuthError::InvalidField("Please enter a valid date of birth.".to_string()))?;

    if dob > chrono::Utc::now().date_naive() {
        return Err(AuthError::InvalidField(
            "Date of birth cannot be in the future.".to_string(),
        ));
    }

    Ok(Some(dob))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::IncorrectPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            fullname: "  Sirikorn A. ".to_string(),
            dob: "2005-04-12".to_string(),
            phone: " 0812345678 ".to_string(),
            email: "Sirikorn@Example.com".to_string(),
            password: SecretString::from("correct horse"),
            address: "Bangkok".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::IncorrectPassword)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_registration_normalizes_fields() {
        let member = registration().validate().unwrap();
        assert_eq!(member.fullname, "Sirikorn A.");
        assert_eq!(member.phone, "0812345678");
        assert_eq!(member.email.as_str(), "sirikorn@example.com");
        assert_eq!(member.dob, NaiveDate::from_ymd_opt(2005, 4, 12));
    }

    #[test]
    fn test_registration_requires_name_and_email() {
        let mut input = registration();
        input.fullname = "   ".to_string();
        assert!(matches!(input.validate(), Err(AuthError::InvalidField(_))));

        let mut input = registration();
        input.email = "sirikorn".to_string();
        assert!(matches!(input.validate(), Err(AuthError::InvalidEmail(_))));
    }

    #[test]
    fn test_parse_dob() {
        assert_eq!(parse_dob("").unwrap(), None);
        assert!(matches!(
            parse_dob("12/04/2005"),
            Err(AuthError::InvalidField(_))
        ));
        assert!(matches!(
            parse_dob("2999-01-01"),
            Err(AuthError::InvalidField(_))
        ));
    }

    #[test]
    fn test_temporary_password_shape() {
        for _ in 0..50 {
            let password = generate_temporary_password();
            let value = password.expose_secret();
            assert_eq!(value.len(), TEMPORARY_PASSWORD_LENGTH);
            assert!(
                value
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            );
        }
    }
}
