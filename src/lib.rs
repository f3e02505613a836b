/// Basic application code
pub mod app;
/// Controllers for page endpoints
pub mod controller;
/// Domain objects
pub mod domain;
/// Per-client submission rate limiting
pub mod limiter;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Signup workflow
pub mod signup;
/// Application telemetry for tracing and logging
pub mod telemetry;
