//! Middleware for Web API.

pub mod auth;
pub mod cors;
pub mod origin;
pub mod security;

pub use auth::AdminUser;
pub use cors::create_cors_layer;
pub use origin::{origin_guard, OriginPolicy};
pub use security::security_headers;
