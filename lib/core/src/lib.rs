//! Core domain types and utilities for the timeclock client.
//!
//! This crate provides the foundational id types and error handling
//! shared by the session core and the HTTP adapter.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EmployeeId, ParseIdError, UserId};
