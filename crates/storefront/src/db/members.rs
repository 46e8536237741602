//! Member repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use aoeyaeng_core::{Email, MemberId};

use super::{RepositoryError, classify};
use crate::models::{Member, NewMember};

/// Row shape shared by every member query.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    member_id: MemberId,
    fullname: String,
    dob: Option<NaiveDate>,
    phone: String,
    email: String,
    address: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberWithHashRow {
    #[sqlx(flatten)]
    member: MemberRow,
    password_hash: String,
}

impl TryFrom<MemberRow> for Member {
    type Error = RepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.member_id,
            fullname: row.fullname,
            dob: row.dob,
            phone: row.phone,
            email,
            address: row.address,
            created_at: row.created_at,
        })
    }
}

const MEMBER_COLUMNS: &str = "member_id, fullname, dob, phone, email, address, created_at";

/// Repository for `storefront.member`.
pub struct MemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a member by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Member>, RepositoryError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM storefront.member WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(Member::try_from).transpose()
    }

    /// Get a member together with their password hash, for login checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Member, String)>, RepositoryError> {
        let row: Option<MemberWithHashRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS}, password_hash FROM storefront.member WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((Member::try_from(r.member)?, r.password_hash)))
            .transpose()
    }

    /// Get a member's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member no longer exists.
    pub async fn get_password_hash(&self, id: MemberId) -> Result<String, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM storefront.member WHERE member_id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(|(hash,)| hash).ok_or(RepositoryError::NotFound)
    }

    /// Insert a new member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        member: &NewMember,
        password_hash: &str,
    ) -> Result<Member, RepositoryError> {
        let row: MemberRow = sqlx::query_as(&format!(
            r"
            INSERT INTO storefront.member (fullname, dob, phone, email, password_hash, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MEMBER_COLUMNS}
            "
        ))
        .bind(&member.fullname)
        .bind(member.dob)
        .bind(&member.phone)
        .bind(&member.email)
        .bind(password_hash)
        .bind(&member.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| classify(e, "email already exists"))?;

        Member::try_from(row)
    }

    /// Replace a member's password hash. `updated_at` is maintained by the
    /// `member_touch_updated_at` trigger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member doesn't exist.
    pub async fn update_password(
        &self,
        id: MemberId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.member
            SET password_hash = $1
            WHERE member_id = $2
            ",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Start a transaction on the repository's pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        Ok(self.pool.begin().await?)
    }

    /// Replace a member's password hash by email inside `tx`.
    ///
    /// Nothing is visible to other connections until the caller commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no member has this email.
    pub async fn update_password_by_email_in(
        tx: &mut Transaction<'_, Postgres>,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.member
            SET password_hash = $1
            WHERE email = $2
            ",
        )
        .bind(password_hash)
        .bind(email)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
