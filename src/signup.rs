use std::time::Duration;

use sqlx::PgPool;

use crate::domain::EmailAddress;
use crate::limiter::{Quota, RateLimiter};
use crate::repo::{InsertError, SubmissionRepo};

pub const THANK_YOU_MESSAGE: &str =
    "Thank you for providing your email. I'll be sure to inform you when the website is ready!";
pub const DUPLICATE_MESSAGE: &str = "This email has already been submitted";
pub const TRY_AGAIN_MESSAGE: &str = "Something went wrong. Please try again.";

/// A field-level validation message for the submission form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn email(message: impl Into<String>) -> Self {
        Self {
            field: "email",
            message: message.into(),
        }
    }
}

/// The outcome of a submission attempt.
///
/// Expected failures (bad input, duplicates, exhausted quota) are outcomes,
/// not errors; nothing in the workflow propagates a failure to the caller.
#[derive(Debug)]
pub enum Outcome {
    /// A new record was created
    Accepted { message: &'static str },
    /// Validation failed or the email is already on file
    Rejected { errors: Vec<FieldError> },
    /// The client's quota is exhausted; the handler never ran
    RateLimited { retry_after: Duration },
}

/// Run the submission workflow for one request.
///
/// Order: rate limiter, validator, duplicate pre-check, insert. The
/// pre-check is a UX shortcut only; the unique constraint on the table
/// decides dedup under concurrent identical submissions. Store failures are
/// logged and surfaced as a generic retry message, never as a crash.
#[tracing::instrument(name = "Submit email", skip(pool, limiter))]
pub async fn submit(
    pool: &PgPool,
    limiter: &RateLimiter,
    client: &str,
    raw_email: &str,
) -> Outcome {
    if let Quota::Limited { retry_after } = limiter.check(client) {
        return Outcome::RateLimited { retry_after };
    }

    let email: EmailAddress = match raw_email.parse() {
        Ok(email) => email,
        Err(e) => {
            return Outcome::Rejected {
                errors: vec![FieldError::email(e.to_string())],
            }
        }
    };

    match SubmissionRepo::find_by_email(pool, &email).await {
        Ok(Some(_)) => {
            return Outcome::Rejected {
                errors: vec![FieldError::email(DUPLICATE_MESSAGE)],
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to query for existing submission: {:?}", e);
            return Outcome::Rejected {
                errors: vec![FieldError::email(TRY_AGAIN_MESSAGE)],
            };
        }
    }

    match SubmissionRepo::insert(pool, &email).await {
        Ok(submission) => {
            tracing::info!(id = submission.id, "New email submission recorded");
            Outcome::Accepted {
                message: THANK_YOU_MESSAGE,
            }
        }
        // Lost the race against a concurrent identical submission
        Err(InsertError::Duplicate) => Outcome::Rejected {
            errors: vec![FieldError::email(DUPLICATE_MESSAGE)],
        },
        Err(InsertError::Database(e)) => {
            tracing::error!("Failed to insert submission: {:?}", e);
            Outcome::Rejected {
                errors: vec![FieldError::email(TRY_AGAIN_MESSAGE)],
            }
        }
    }
}
