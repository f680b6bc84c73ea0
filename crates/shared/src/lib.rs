//! Shared types, errors, and configuration for JobLedger.
//!
//! This crate provides common types used across all other crates:
//! - Decimal money helpers (rounding, parsing, formatting)
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token service
//! - SMTP email delivery

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig, ReportConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
