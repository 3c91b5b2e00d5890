use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::caps::{CapAmounts, CapLookupError, CapTable};
use super::domain::{
    Building, BuildingDraft, BuildingId, BuildingSubmission, BuildingSummary, Contract, ContractId,
    ContractSubmission, Evidence, EvidenceCategory, EvidenceId, EvidenceSubmission, ReportId,
    TenantId,
};
use super::evaluation::EligibilityEngine;
use super::facts::collect_facts;
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{
    AuthError, DepositRepository, DepositTransaction, ReportRecord, ReportView, RepositoryError,
    TenantResolver, TrustedIdentityResolver, ValuationError, ValuationProvider,
};

static BUILDING_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CONTRACT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EVIDENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_building_id() -> BuildingId {
    let id = BUILDING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BuildingId(format!("bld-{id:06}"))
}

fn next_contract_id() -> ContractId {
    let id = CONTRACT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ContractId(format!("ctr-{id:06}"))
}

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

fn next_evidence_id() -> EvidenceId {
    let id = EVIDENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvidenceId(format!("evd-{id:06}"))
}

/// Service composing intake validation, the eligibility engine, and report persistence.
pub struct DepositReportService<R, V> {
    guard: IntakeGuard,
    repository: Arc<R>,
    valuation: Arc<V>,
    resolver: Arc<dyn TenantResolver>,
    engine: Arc<EligibilityEngine>,
}

impl<R, V> DepositReportService<R, V>
where
    R: DepositRepository + 'static,
    V: ValuationProvider + 'static,
{
    pub fn new(repository: Arc<R>, valuation: Arc<V>, caps: CapTable) -> Self {
        Self {
            guard: IntakeGuard,
            repository,
            valuation,
            resolver: Arc::new(TrustedIdentityResolver),
            engine: Arc::new(EligibilityEngine::new(Arc::new(caps))),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn TenantResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    pub fn resolve_tenant(&self, identity: &str) -> Result<TenantId, DepositServiceError> {
        Ok(self.resolver.resolve_tenant(identity)?)
    }

    pub fn resolve_cap(
        &self,
        address: &str,
        as_of: NaiveDate,
    ) -> Result<CapAmounts, DepositServiceError> {
        Ok(self.engine.caps().resolve_cap(address, as_of)?)
    }

    /// Register a building, or refresh the lien date of the unit already on file.
    pub fn submit_building(
        &self,
        submission: BuildingSubmission,
    ) -> Result<BuildingSummary, DepositServiceError> {
        let draft = self
            .guard
            .building_from_submission(submission)
            .inspect_err(|err| warn!(error = %err, "building submission rejected"))?;

        if let Some(existing) = self.repository.find_building_by_key(&draft.key)? {
            return self.refresh_building(existing, &draft);
        }

        let name = self.valuation.lookup_name(&draft.key.address)?;
        let market_price = self.valuation.lookup_market_price(&draft)?;

        let building = Building {
            id: next_building_id(),
            name,
            key: draft.key.clone(),
            building_type: draft.building_type,
            market_price,
            lien_registration_date: draft.lien_registration_date,
            collateral_amount: draft.collateral_amount,
        };
        match self.repository.insert_building(building) {
            Ok(stored) => {
                info!(
                    building = %stored.id.0,
                    market_price = stored.market_price,
                    "registered building"
                );
                Ok(stored.summary())
            }
            // A concurrent submission registered the same unit first.
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .repository
                    .find_building_by_key(&draft.key)?
                    .ok_or(RepositoryError::Conflict)?;
                self.refresh_building(existing, &draft)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn refresh_building(
        &self,
        mut existing: Building,
        draft: &BuildingDraft,
    ) -> Result<BuildingSummary, DepositServiceError> {
        if draft.lien_registration_date.is_some() {
            existing.lien_registration_date = draft.lien_registration_date;
        }
        if draft.collateral_amount.is_some() {
            existing.collateral_amount = draft.collateral_amount;
        }
        self.repository.update_building(existing.clone())?;
        debug!(building = %existing.id.0, "refreshed existing building");
        Ok(existing.summary())
    }

    /// Record the tenant's lease and replace any prior report with a fresh verdict.
    pub fn submit_report(
        &self,
        tenant: &TenantId,
        submission: ContractSubmission,
    ) -> Result<ReportRecord, DepositServiceError> {
        let terms = self
            .guard
            .contract_terms(submission)
            .inspect_err(|err| warn!(tenant = %tenant.0, error = %err, "contract rejected"))?;
        let now = Utc::now();

        let mut tx = self.repository.begin()?;
        let building = tx.find_building(&terms.building_id)?.ok_or_else(|| {
            DepositServiceError::BuildingNotFound {
                building_id: terms.building_id.0.clone(),
            }
        })?;

        let contract_id = tx
            .find_contract_by_tenant(tenant)?
            .map(|existing| existing.id)
            .unwrap_or_else(next_contract_id);
        let contract = Contract::from_terms(contract_id, tenant.clone(), terms, now);
        tx.save_contract(contract.clone())?;

        if let Some(storage_key) = &contract.contract_image {
            let on_file = tx
                .find_evidence_by_contract(&contract.id)?
                .iter()
                .any(|evidence| &evidence.storage_key == storage_key);
            if !on_file {
                tx.insert_evidence(Evidence {
                    id: next_evidence_id(),
                    tenant_id: tenant.clone(),
                    contract_id: contract.id.clone(),
                    category: EvidenceCategory::ContractImage,
                    storage_key: storage_key.clone(),
                    registered_at: now,
                })?;
            }
        }

        let record = self.replace_report(tx.as_mut(), &contract, &building, now)?;
        tx.commit()
            .inspect_err(|err| warn!(tenant = %tenant.0, error = %err, "report commit failed"))?;

        info!(
            tenant = %tenant.0,
            contract = %contract.id.0,
            status = record.verdict.status.label(),
            repayment = record.verdict.repayment_amount,
            "deposit report stored"
        );
        Ok(record)
    }

    /// Recompute the verdict for the tenant's existing contract.
    pub fn reevaluate(&self, tenant: &TenantId) -> Result<ReportRecord, DepositServiceError> {
        let now = Utc::now();
        let mut tx = self.repository.begin()?;
        let contract = tx
            .find_contract_by_tenant(tenant)?
            .ok_or(DepositServiceError::NoContract)?;
        let building = tx.find_building(&contract.building_id)?.ok_or_else(|| {
            DepositServiceError::BuildingNotFound {
                building_id: contract.building_id.0.clone(),
            }
        })?;

        let record = self.replace_report(tx.as_mut(), &contract, &building, now)?;
        tx.commit()?;

        info!(
            tenant = %tenant.0,
            contract = %contract.id.0,
            status = record.verdict.status.label(),
            repayment = record.verdict.repayment_amount,
            "deposit report re-evaluated"
        );
        Ok(record)
    }

    /// The tenant's current report, or `None` when no contract or report exists yet.
    pub fn get_report(&self, tenant: &TenantId) -> Result<Option<ReportView>, DepositServiceError> {
        let Some(contract) = self.repository.find_contract_by_tenant(tenant)? else {
            return Ok(None);
        };
        let Some(report) = self.repository.find_report_by_contract(&contract.id)? else {
            return Ok(None);
        };
        let building = self
            .repository
            .find_building(&contract.building_id)?
            .ok_or_else(|| DepositServiceError::BuildingNotFound {
                building_id: contract.building_id.0.clone(),
            })?;

        Ok(Some(report.view(&contract, &building)))
    }

    /// Delete the tenant's contract together with its report and evidence records.
    pub fn delete_report(&self, tenant: &TenantId) -> Result<(), DepositServiceError> {
        let mut tx = self.repository.begin()?;
        let contract = tx
            .find_contract_by_tenant(tenant)?
            .ok_or(DepositServiceError::NothingToDelete)?;

        tx.delete_report(&contract.id)?;
        tx.delete_evidence(&contract.id)?;
        tx.delete_contract(&contract.id)?;
        tx.commit()?;

        info!(tenant = %tenant.0, contract = %contract.id.0, "deposit report deleted");
        Ok(())
    }

    /// Attach a supporting document to the tenant's contract.
    pub fn register_evidence(
        &self,
        tenant: &TenantId,
        submission: EvidenceSubmission,
    ) -> Result<Evidence, DepositServiceError> {
        let submission = self.guard.evidence(submission)?;
        let mut tx = self.repository.begin()?;
        let contract = tx
            .find_contract_by_tenant(tenant)?
            .ok_or(DepositServiceError::NoContract)?;

        let evidence = Evidence {
            id: next_evidence_id(),
            tenant_id: tenant.clone(),
            contract_id: contract.id,
            category: submission.category,
            storage_key: submission.storage_key,
            registered_at: Utc::now(),
        };
        tx.insert_evidence(evidence.clone())?;
        tx.commit()?;

        debug!(tenant = %tenant.0, evidence = %evidence.id.0, "evidence registered");
        Ok(evidence)
    }

    fn replace_report(
        &self,
        tx: &mut (dyn DepositTransaction + '_),
        contract: &Contract,
        building: &Building,
        now: DateTime<Utc>,
    ) -> Result<ReportRecord, DepositServiceError> {
        let evidence_exists = !tx.find_evidence_by_contract(&contract.id)?.is_empty();
        let facts = collect_facts(contract, building, evidence_exists);
        debug!(contract = %contract.id.0, ?facts, "collected eligibility facts");

        let verdict = self.engine.evaluate(&facts, now.date_naive())?;

        if tx.delete_report(&contract.id)? {
            debug!(contract = %contract.id.0, "replacing previous report");
        }

        let record = ReportRecord {
            report_id: next_report_id(),
            contract_id: contract.id.clone(),
            verdict,
            created_at: now,
        };
        tx.insert_report(record.clone())?;
        Ok(record)
    }
}

/// Error raised by the deposit report service.
#[derive(Debug, thiserror::Error)]
pub enum DepositServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    CapLookup(#[from] CapLookupError),
    #[error("building '{building_id}' was not found")]
    BuildingNotFound { building_id: String },
    #[error("no contract has been submitted for this tenant")]
    NoContract,
    #[error("nothing to delete: no contract has been submitted for this tenant")]
    NothingToDelete,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DepositServiceError {
    /// Persistence and valuation outages may succeed on retry; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DepositServiceError::Repository(
                RepositoryError::Unavailable(_) | RepositoryError::TransactionAborted(_)
            ) | DepositServiceError::Valuation(ValuationError::Unavailable(_))
        )
    }
}
