use std::fmt::Write;

use actix_web::dev::HttpServiceFactory;
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use crate::limiter::RateLimiter;
use crate::repo::SubmissionRepo;
use crate::signup::{self, FieldError, Outcome};

/// Form deserialization wrapper for parsing submissions.
/// A missing field deserializes to an empty string so the validator can
/// report it as required.
#[derive(Debug, Deserialize)]
pub struct SubmissionForm {
    #[serde(default)]
    email: String,
}

/// Render the empty signup form
#[tracing::instrument(name = "Render signup form", skip(pool))]
#[get("/")]
async fn index(pool: web::Data<PgPool>) -> impl Responder {
    probe_store(pool.get_ref()).await;

    page(render_page("", &[], None))
}

/// Accept a signup submission and re-render the page with the outcome
#[tracing::instrument(name = "Submit signup form", skip(req, pool, limiter, form))]
#[post("/")]
async fn create(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    limiter: web::Data<RateLimiter>,
    form: web::Form<SubmissionForm>,
) -> impl Responder {
    let client = client_addr(&req);

    let outcome = signup::submit(pool.get_ref(), limiter.get_ref(), &client, &form.email).await;

    probe_store(pool.get_ref()).await;

    match outcome {
        Outcome::Accepted { message } => page(render_page("", &[], Some(message))),
        Outcome::Rejected { errors } => page(render_page(&form.email, &errors, None)),
        Outcome::RateLimited { retry_after } => HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, retry_after.as_secs().max(1).to_string()))
            .content_type("text/html; charset=utf-8")
            .body(render_rate_limited()),
    }
}

/// Client identity for rate limiting: the originating network address.
/// Weak behind shared NAT/proxies; accepted for this scope.
fn client_addr(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Liveness query against the store, run on every render.
/// Purely observational: failure is logged and never alters the response.
async fn probe_store(pool: &PgPool) {
    if let Err(e) = SubmissionRepo::ping(pool).await {
        tracing::error!("Health probe query failed: {:?}", e);
    }
}

fn page(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn render_page(email_value: &str, errors: &[FieldError], message: Option<&str>) -> String {
    let mut body = String::from(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Coming Soon</title>\n</head>\n<body>\n<h1>Coming Soon</h1>\n\
         <p>Leave your email and we'll let you know when the site is ready.</p>\n",
    );

    if let Some(message) = message {
        let _ = writeln!(body, "<p class=\"message\">{}</p>", escape_html(message));
    }

    body.push_str("<form method=\"post\" action=\"/\">\n<label for=\"email\">Email</label>\n");
    let _ = writeln!(
        body,
        "<input type=\"text\" id=\"email\" name=\"email\" value=\"{}\">",
        escape_html(email_value)
    );

    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">\n");
        for error in errors {
            let _ = writeln!(body, "<li>{}</li>", escape_html(&error.message));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<button type=\"submit\">Notify me</button>\n</form>\n</body>\n</html>\n");
    body
}

fn render_rate_limited() -> String {
    "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
     <title>Coming Soon</title>\n</head>\n<body>\n<h1>Too many submissions</h1>\n\
     <p>Please wait a minute before trying again.</p>\n</body>\n</html>\n"
        .to_string()
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Signup page endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("").service(index).service(create)
}
