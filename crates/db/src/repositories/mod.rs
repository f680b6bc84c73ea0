//! Repository abstractions for data access.
//!
//! Every repository method takes the authenticated contractor's ID and scopes
//! its queries to it; records owned by another contractor are reported as not
//! found.

pub mod catalog;
pub mod contractor;
pub mod entry;
pub mod estimate;
pub mod project;
pub mod report;
pub mod user;

pub use catalog::{CatalogError, CatalogRepository, MaterialInput, RateSourceInput};
pub use contractor::{
    ContractorError, ContractorRepository, CreateContractorInput, UpdateContractorInput,
};
pub use entry::{EntryError, EntryInput, EntryRepository, EntrySearchHit, PricedEntry};
pub use estimate::{EstimateInput, EstimateRepoError, EstimateRepository, EstimateSummary};
pub use project::{PaymentInput, ProjectError, ProjectInput, ProjectRepository};
pub use report::{ReportRepoError, ReportRepository};
pub use user::UserRepository;
