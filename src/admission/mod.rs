//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request metadata:
//!     → descriptor.rs (typed RequestDescriptor, ClientKey derivation)
//!     → gate.rs (ordered policy pipeline, first failure wins)
//!     → rate_limit.rs (fixed-window counters, reached only by requests
//!       that passed every identity check)
//!     → Admit / Reject(reason)
//! ```
//!
//! # Design Decisions
//! - Checks run in a fixed order; rejections before the rate-limit step
//!   never touch shared state
//! - Fail closed: any policy failure rejects the request
//! - The window store is injected at construction, not a process global

pub mod descriptor;
pub mod gate;
pub mod rate_limit;

pub use descriptor::{ClientKey, RequestDescriptor};
pub use gate::{AdmissionGate, Decision, RejectReason};
pub use rate_limit::{WindowStore, WindowVerdict};
