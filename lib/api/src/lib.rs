//! HTTP adapter for the timeclock tracking service.
//!
//! This crate turns the session core's ports into real HTTP: an
//! [`ApiClient`] that implements the authentication endpoints, attaches the
//! stored bearer token to outgoing requests, and feeds authorization
//! failures back into the session lifecycle.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
