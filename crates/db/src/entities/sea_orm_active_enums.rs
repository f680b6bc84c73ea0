//! `SeaORM` active enums backed by Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use jobledger_core::estimate::EstimateStatus as DomainStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "estimate_status")]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "accepted")]
    Accepted,
}

impl From<EstimateStatus> for DomainStatus {
    fn from(status: EstimateStatus) -> Self {
        match status {
            EstimateStatus::Draft => Self::Draft,
            EstimateStatus::Sent => Self::Sent,
            EstimateStatus::Accepted => Self::Accepted,
        }
    }
}

impl From<DomainStatus> for EstimateStatus {
    fn from(status: DomainStatus) -> Self {
        match status {
            DomainStatus::Draft => Self::Draft,
            DomainStatus::Sent => Self::Sent,
            DomainStatus::Accepted => Self::Accepted,
        }
    }
}
