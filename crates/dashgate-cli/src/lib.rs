//! # Dashgate CLI
//!
//! Account bootstrapping used by the `dashgate-cli` binary.
//!
//! ```ignore
//! use dashgate_cli::admin::create_admin_master;
//!
//! create_admin_master(&pool, "Ana", "Silva", "ana@example.com", "password123").await?;
//! ```

pub mod admin;
