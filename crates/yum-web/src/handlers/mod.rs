pub mod contacts;
pub mod login;

/// `GET /_ah/health`: liveness probe.
pub async fn health() -> &'static str { "ok" }
