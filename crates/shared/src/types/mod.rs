//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{format_money, parse_amount, parse_optional_amount, round_money};
pub use pagination::{PageMeta, PageRequest, PageResponse};
