//! Priority-repayment eligibility for tenant security deposits after foreclosure.
//!
//! Data flows leaf-first: the intake guard validates raw submissions, the fact collector
//! flattens contract, building, and evidence into [`EligibilityFacts`], the cap table
//! resolves the statutory tier for the building's region and reference date, the engine
//! decides the verdict, and the service replaces the contract's report inside a single
//! repository transaction.

pub mod caps;
pub mod domain;
pub mod evaluation;
pub mod facts;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use caps::{
    classify_region, CapAmounts, CapLookupError, CapTable, CapTableImportError, CapTier,
    RegionClass,
};
pub use domain::{
    Building, BuildingDraft, BuildingId, BuildingKey, BuildingSubmission, BuildingSummary,
    BuildingType, Contract, ContractId, ContractSubmission, Evidence, EvidenceCategory,
    EvidenceId, EvidenceSubmission, ReportId, ReportStatus, TenantId,
};
pub use evaluation::{decide, EligibilityEngine, EligibilityGate, GateComponent, Verdict};
pub use facts::{collect_facts, EligibilityFacts};
pub use intake::IntakeViolation;
pub use repository::{
    AuthError, DepositRepository, DepositTransaction, ReportRecord, ReportView, RepositoryError,
    TenantResolver, TrustedIdentityResolver, ValuationError, ValuationProvider,
};
pub use router::{deposit_router, TENANT_IDENTITY_HEADER};
pub use service::{DepositReportService, DepositServiceError};
pub use store::InMemoryDepositRepository;
