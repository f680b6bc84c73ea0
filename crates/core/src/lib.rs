//! Core business logic for JobLedger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `billing` - Cost and billable amounts for a single usage entry
//! - `reports` - Rollups across projects, estimates and contractors
//! - `estimate` - Estimate status rules
//! - `text` - Display cleanup for entry descriptions
//! - `auth` - Password hashing

pub mod auth;
pub mod billing;
pub mod estimate;
pub mod reports;
pub mod text;
