//! Middleware for request logging and traffic control.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// Standard request logger:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// CORS policy. The API is consumed by browser frontends that may live on
/// a different origin than the backend.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .max_age(3600)
}
