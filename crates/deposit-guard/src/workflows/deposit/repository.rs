use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Building, BuildingDraft, BuildingId, BuildingKey, BuildingType, Contract, ContractId,
    Evidence, ReportId, ReportStatus, TenantId,
};
use super::evaluation::Verdict;

/// Persisted verdict for a contract. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub contract_id: ContractId,
    pub verdict: Verdict,
    pub created_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn view(&self, contract: &Contract, building: &Building) -> ReportView {
        ReportView {
            report_id: self.report_id.clone(),
            status: self.verdict.status,
            reported_at: self.created_at,
            repayment_amount: self.verdict.repayment_amount,
            standing: self.verdict.standing,
            low_income_qualified: self.verdict.low_income_qualified,
            evidence_submitted: self.verdict.evidence_submitted,
            rationale: self.verdict.summary(),
            building_name: building.name.clone(),
            address: building.key.address.clone(),
            dong: building.key.dong.clone(),
            unit: building.key.unit.clone(),
            building_type: building.building_type,
            lien_registration_date: building.lien_registration_date,
            has_lived: contract.has_lived,
            transport_report_date: contract.transport_report_date,
            confirmation_date: contract.confirmation_date,
            has_landlord_intervention: contract.has_landlord_intervention,
            has_applied_dividend: contract.has_applied_dividend,
            deposit: contract.deposit,
        }
    }
}

/// Tenant-facing report payload combining the verdict with the facts behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub report_id: ReportId,
    pub status: ReportStatus,
    pub reported_at: DateTime<Utc>,
    pub repayment_amount: u64,
    pub standing: bool,
    pub low_income_qualified: bool,
    pub evidence_submitted: bool,
    pub rationale: String,
    pub building_name: String,
    pub address: String,
    pub dong: String,
    pub unit: String,
    pub building_type: BuildingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lien_registration_date: Option<NaiveDate>,
    pub has_lived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_report_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_date: Option<NaiveDate>,
    pub has_landlord_intervention: bool,
    pub has_applied_dividend: bool,
    pub deposit: u64,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait DepositRepository: Send + Sync {
    fn find_building(&self, id: &BuildingId) -> Result<Option<Building>, RepositoryError>;
    fn find_building_by_key(&self, key: &BuildingKey)
        -> Result<Option<Building>, RepositoryError>;
    fn insert_building(&self, building: Building) -> Result<Building, RepositoryError>;
    fn update_building(&self, building: Building) -> Result<(), RepositoryError>;
    fn find_contract_by_tenant(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError>;
    fn find_report_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Option<ReportRecord>, RepositoryError>;
    fn find_evidence_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError>;
    fn insert_evidence(&self, evidence: Evidence) -> Result<(), RepositoryError>;
    /// Open a unit of work. Writes become visible only on commit.
    fn begin(&self) -> Result<Box<dyn DepositTransaction + '_>, RepositoryError>;
}

/// Transactional boundary for contract/report replacement.
///
/// Dropping a transaction without calling [`DepositTransaction::commit`] discards every
/// staged write.
pub trait DepositTransaction {
    fn find_building(&mut self, id: &BuildingId) -> Result<Option<Building>, RepositoryError>;
    fn find_contract_by_tenant(
        &mut self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError>;
    fn find_evidence_by_contract(
        &mut self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError>;
    /// Insert or replace a contract. A tenant may hold only one contract.
    fn save_contract(&mut self, contract: Contract) -> Result<(), RepositoryError>;
    fn delete_contract(&mut self, contract: &ContractId) -> Result<bool, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the contract already has a report.
    fn insert_report(&mut self, report: ReportRecord) -> Result<(), RepositoryError>;
    fn delete_report(&mut self, contract: &ContractId) -> Result<bool, RepositoryError>;
    fn insert_evidence(&mut self, evidence: Evidence) -> Result<(), RepositoryError>;
    fn delete_evidence(&mut self, contract: &ContractId) -> Result<usize, RepositoryError>;
    fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),
}

/// Third-party registry used for official building names and market prices.
pub trait ValuationProvider: Send + Sync {
    fn lookup_name(&self, address: &str) -> Result<String, ValuationError>;
    fn lookup_market_price(&self, building: &BuildingDraft) -> Result<u64, ValuationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("valuation provider unavailable: {0}")]
    Unavailable(String),
}

/// Maps an authenticated identity (session subject, gateway header) to a tenant.
pub trait TenantResolver: Send + Sync {
    fn resolve_tenant(&self, identity: &str) -> Result<TenantId, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("request is not authenticated")]
    Unauthenticated,
}

/// Resolver for deployments behind an authenticating gateway: any non-blank identity is
/// taken as the tenant id.
#[derive(Debug, Clone, Default)]
pub struct TrustedIdentityResolver;

impl TenantResolver for TrustedIdentityResolver {
    fn resolve_tenant(&self, identity: &str) -> Result<TenantId, AuthError> {
        let trimmed = identity.trim();
        if trimmed.is_empty() {
            return Err(AuthError::Unauthenticated);
        }
        Ok(TenantId(trimmed.to_string()))
    }
}
