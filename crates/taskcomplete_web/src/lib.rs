//! HTTP surface for Task Complete.
//!
//! # Responsibility
//! - Route table and per-request plumbing (session cookie, login gate, logs).
//! - Translate core services into page contexts and redirects.
//!
//! # Invariants
//! - All authorization decisions come from `taskcomplete_core` services.
//! - Non-root pages answer JSON page contexts; the landing page is HTML.

pub mod error;
pub mod extract;
pub mod request_log;
pub mod response;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod views;

pub use error::{WebError, WebResult};
pub use routes::build_router;
pub use server::run_server;
pub use state::{AppState, WebSettings};
