//! Authentication/licensing gateway for a third-party signal API.
//!
//! Flat-file license and user stores, a login-attempt log, and an
//! admission gate (CORS allow-list, user-agent blocklist, origin/referer
//! corroboration, shared-secret header, fixed-window rate limiting) in
//! front of the signal proxy route.

pub mod admission;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
