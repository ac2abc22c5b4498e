//! Middleware applied around the route handlers.

pub mod admission;

pub use admission::{admission_middleware, AdmissionState};
