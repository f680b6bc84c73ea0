//! Password hashing for contractor logins.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - Minimum password policy

mod password;

pub use password::{PasswordError, hash_password, validate_password_policy, verify_password};
