//! Web API module.
//!
//! The HTTP surface of the portal: the upload endpoint, static retrieval of
//! stored files, the applicant records API and admin sessions.

pub mod api_doc;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use api_doc::ApiDoc;
pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
