use std::time::Duration;

use reqwest::StatusCode;

use sqlx::PgPool;

use launchlist::limiter::RateLimiter;

use crate::helpers::{SubmissionForm, TestApp};

#[sqlx::test]
async fn signup_page_renders_the_form(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app.signup_page().await.expect("Failed to execute request");

    assert!(res.status().is_success());

    let body = res.text().await.expect("Failed to read body");
    assert!(body.contains("<form method=\"post\""));
    assert!(body.contains("name=\"email\""));

    Ok(())
}

#[sqlx::test]
async fn submit_returns_thank_you_for_valid_email(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .submit(&SubmissionForm::with_email("someone@example.com"))
        .await
        .expect("Failed to execute request");

    assert!(res.status().is_success());

    let body = res.text().await.expect("Failed to read body");
    assert!(body.contains("Thank you for providing your email"));

    let row = sqlx::query_as::<_, (String,)>("select email from submissions")
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch inserted row");

    assert_eq!("someone@example.com", row.0);

    Ok(())
}

#[sqlx::test]
async fn submit_rerenders_with_errors_for_bad_input(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let test_cases: Vec<(&str, SubmissionForm, &str)> = vec![
        (
            "missing email field",
            SubmissionForm { email: None },
            "Email address is required",
        ),
        (
            "blank email",
            SubmissionForm::with_email("   "),
            "Email address is required",
        ),
        (
            "missing at-sign",
            SubmissionForm::with_email("not-an-email"),
            "Email address of incorrect format",
        ),
        (
            "missing domain label",
            SubmissionForm::with_email("user@localhost"),
            "Email address of incorrect format",
        ),
    ];

    for (desc, form, expected_error) in test_cases {
        let res = app.submit(&form).await.expect("Failed to execute request");

        // Validation rejections are a normal render, not an HTTP error
        assert_eq!(StatusCode::OK, res.status(), "payload was {}", desc);

        let body = res.text().await.expect("Failed to read body");
        assert!(
            body.contains(expected_error),
            "missing error for payload {}",
            desc
        );
    }

    let count: i64 = sqlx::query_scalar("select count(*) from submissions")
        .fetch_one(&pool)
        .await
        .expect("Failed to count records");

    assert_eq!(0, count);

    Ok(())
}

#[sqlx::test]
async fn duplicate_submission_is_rejected_with_one_record(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let form = SubmissionForm::with_email("someone@example.com");

    let first = app.submit(&form).await.expect("Failed to execute request");
    assert!(first.status().is_success());

    let second = app.submit(&form).await.expect("Failed to execute request");
    assert_eq!(StatusCode::OK, second.status());

    let body = second.text().await.expect("Failed to read body");
    assert!(body.contains("This email has already been submitted"));

    let count: i64 = sqlx::query_scalar("select count(*) from submissions")
        .fetch_one(&pool)
        .await
        .expect("Failed to count records");

    assert_eq!(1, count);

    Ok(())
}

#[sqlx::test]
async fn sixteenth_attempt_in_window_is_rate_limited(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn_with_limiter(
        &pool,
        RateLimiter::new(15, Duration::from_secs(60)),
    )
    .await;

    // Quota applies regardless of payload validity
    let form = SubmissionForm::with_email("not-an-email");

    for n in 1..=15 {
        let res = app.submit(&form).await.expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status(), "attempt {}", n);
    }

    let res = app.submit(&form).await.expect("Failed to execute request");
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, res.status());
    assert!(res.headers().contains_key("retry-after"));

    Ok(())
}

#[sqlx::test]
async fn rate_limited_client_does_not_block_page_renders(pool: PgPool) -> sqlx::Result<()> {
    let app =
        TestApp::spawn_with_limiter(&pool, RateLimiter::new(1, Duration::from_secs(60))).await;

    let form = SubmissionForm::with_email("someone@example.com");
    app.submit(&form).await.expect("Failed to execute request");

    let res = app.submit(&form).await.expect("Failed to execute request");
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, res.status());

    // GET renders do not consume or require submission quota
    let res = app.signup_page().await.expect("Failed to execute request");
    assert!(res.status().is_success());

    Ok(())
}
