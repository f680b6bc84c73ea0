//! `SeaORM` entity definitions.

pub mod assets;
pub mod contractor_users;
pub mod contractors;
pub mod employees;
pub mod estimate_entries;
pub mod estimates;
pub mod job_entries;
pub mod materials;
pub mod payments;
pub mod projects;
pub mod sea_orm_active_enums;
