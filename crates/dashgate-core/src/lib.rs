//! # Dashgate Core
//!
//! Core types, errors, and utilities shared by every Dashgate crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination parameters and response metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`permissions`]: Permission constants and the role to permission mapping
//! - [`serde`]: Custom serde helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use dashgate_core::{AppError, PaginationParams};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Organization not found"));
//! let params = PaginationParams::default();
//! assert_eq!(params.limit(), 10);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
