//! Upstream signal API subsystem.
//!
//! The gateway never interprets signal payloads; it forwards the query
//! and returns the upstream body verbatim. Everything that is not a 2xx
//! from the upstream becomes an error the HTTP layer maps to 502.

pub mod signals;

pub use signals::{SignalClient, SignalQuery, UpstreamError};
