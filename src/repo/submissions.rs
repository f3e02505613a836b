use sqlx::PgExecutor;

use crate::domain::EmailAddress;

/// Stored email submission record
#[derive(Debug, sqlx::FromRow)]
pub struct EmailSubmission {
    /// Surrogate key, assigned once by the database
    pub id: i64,
    pub email: String,
}

/// Insert failure, with unique-constraint conflicts split out so callers can
/// treat a racing duplicate as a rejection rather than a server error.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("email already submitted")]
    Duplicate,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository for interfacing with the submissions table
pub struct SubmissionRepo;

impl SubmissionRepo {
    #[tracing::instrument(name = "Find submission by email", skip(executor))]
    pub async fn find_by_email<'con>(
        executor: impl PgExecutor<'con>,
        email: &EmailAddress,
    ) -> sqlx::Result<Option<EmailSubmission>> {
        sqlx::query_as::<_, EmailSubmission>("select id, email from submissions where email = $1")
            .bind(email.as_ref())
            .fetch_optional(executor)
            .await
    }

    /// Insert a new submission.
    ///
    /// The unique constraint on `email` is the source of truth for dedup;
    /// a conflicting concurrent insert surfaces as `InsertError::Duplicate`.
    #[tracing::instrument(name = "Insert submission", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        email: &EmailAddress,
    ) -> Result<EmailSubmission, InsertError> {
        sqlx::query_as::<_, EmailSubmission>(
            "insert into submissions(email) values ($1) returning id, email",
        )
        .bind(email.as_ref())
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => InsertError::Duplicate,
            other => InsertError::Database(other),
        })
    }

    /// Trivial liveness query for the health probe
    #[tracing::instrument(name = "Ping database", skip(executor))]
    pub async fn ping<'con>(executor: impl PgExecutor<'con>) -> sqlx::Result<()> {
        sqlx::query("select 1").execute(executor).await?;
        Ok(())
    }
}
