use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::deposit::caps::{CapAmounts, CapTable, CapTier, RegionClass};
use crate::workflows::deposit::domain::{
    Building, BuildingDraft, BuildingId, BuildingKey, BuildingSubmission, BuildingType, Contract,
    ContractId, ContractSubmission, Evidence, TenantId,
};
use crate::workflows::deposit::facts::EligibilityFacts;
use crate::workflows::deposit::repository::{
    DepositRepository, DepositTransaction, ReportRecord, RepositoryError, ValuationError,
    ValuationProvider,
};
use crate::workflows::deposit::store::InMemoryDepositRepository;
use crate::workflows::deposit::{deposit_router, DepositReportService};

pub(super) const ADDRESS: &str = "전라남도 순천시 중앙로 15";

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Single open-ended tier: protection up to 60M, priority repayment up to 20M.
pub(super) fn cap_table() -> CapTable {
    CapTable::new(vec![CapTier {
        region: RegionClass::Other,
        effective_from: day(2021, 5, 11),
        effective_to: None,
        max_protected_deposit: 60_000_000,
        max_priority_repayment: 20_000_000,
    }])
}

pub(super) fn cap() -> CapAmounts {
    CapAmounts {
        region: RegionClass::Other,
        effective_from: day(2021, 5, 11),
        max_protected_deposit: 60_000_000,
        max_priority_repayment: 20_000_000,
    }
}

/// Scenario A facts: every gate satisfied with a 50M deposit.
pub(super) fn favorable_facts() -> EligibilityFacts {
    EligibilityFacts {
        deposit_amount: 50_000_000,
        has_lived: true,
        has_transport_report: true,
        has_confirmation: true,
        has_landlord_intervention: false,
        has_applied_dividend: true,
        evidence_submitted: true,
        building_region: ADDRESS.to_string(),
        confirmation_date: Some(day(2022, 3, 2)),
        lien_registration_date: Some(day(2021, 11, 30)),
    }
}

pub(super) fn building_submission() -> BuildingSubmission {
    BuildingSubmission {
        address: ADDRESS.to_string(),
        dong: "101".to_string(),
        unit: "1203".to_string(),
        area: "84.97".to_string(),
        building_type: BuildingType::Apartment,
        lien_registration_date: Some(day(2021, 11, 30)),
        collateral_amount: Some(120_000_000),
    }
}

pub(super) fn contract_submission(building_id: &BuildingId) -> ContractSubmission {
    ContractSubmission {
        building_id: building_id.clone(),
        has_lived: true,
        transport_report_date: Some(day(2022, 3, 1)),
        confirmation_date: Some(day(2022, 3, 2)),
        has_landlord_intervention: false,
        has_applied_dividend: true,
        deposit: 50_000_000,
        contract_image: Some("uploads/contracts/tenant-1.jpg".to_string()),
    }
}

pub(super) fn tenant(name: &str) -> TenantId {
    TenantId(name.to_string())
}

#[derive(Default)]
pub(super) struct FixedValuation {
    pub(super) calls: AtomicUsize,
}

impl FixedValuation {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ValuationProvider for FixedValuation {
    fn lookup_name(&self, _address: &str) -> Result<String, ValuationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("순천 중앙 아파트".to_string())
    }

    fn lookup_market_price(&self, _building: &BuildingDraft) -> Result<u64, ValuationError> {
        Ok(310_000_000)
    }
}

pub(super) struct OfflineValuation;

impl ValuationProvider for OfflineValuation {
    fn lookup_name(&self, _address: &str) -> Result<String, ValuationError> {
        Err(ValuationError::Unavailable("registry timeout".to_string()))
    }

    fn lookup_market_price(&self, _building: &BuildingDraft) -> Result<u64, ValuationError> {
        Err(ValuationError::Unavailable("registry timeout".to_string()))
    }
}

pub(super) type MemoryService = DepositReportService<InMemoryDepositRepository, FixedValuation>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryDepositRepository>,
    Arc<FixedValuation>,
) {
    let repository = Arc::new(InMemoryDepositRepository::default());
    let valuation = Arc::new(FixedValuation::default());
    let service = DepositReportService::new(repository.clone(), valuation.clone(), cap_table());
    (service, repository, valuation)
}

/// Service with one registered building; returns its id.
pub(super) fn service_with_building() -> (
    MemoryService,
    Arc<InMemoryDepositRepository>,
    BuildingId,
) {
    let (service, repository, _) = build_service();
    let summary = service
        .submit_building(building_submission())
        .expect("building registers");
    (service, repository, summary.building_id)
}

/// Wraps the in-memory store but fails every commit after staging writes.
#[derive(Default)]
pub(super) struct FailingCommitRepository {
    pub(super) inner: InMemoryDepositRepository,
    pub(super) fail_commits: Mutex<bool>,
}

impl FailingCommitRepository {
    pub(super) fn arm(&self) {
        *self.fail_commits.lock().expect("flag mutex poisoned") = true;
    }
}

struct FailingTransaction<'a> {
    inner: Box<dyn DepositTransaction + 'a>,
    fail: bool,
}

impl DepositTransaction for FailingTransaction<'_> {
    fn find_building(&mut self, id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        self.inner.find_building(id)
    }

    fn find_contract_by_tenant(
        &mut self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        self.inner.find_contract_by_tenant(tenant)
    }

    fn find_evidence_by_contract(
        &mut self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        self.inner.find_evidence_by_contract(contract)
    }

    fn save_contract(&mut self, contract: Contract) -> Result<(), RepositoryError> {
        self.inner.save_contract(contract)
    }

    fn delete_contract(&mut self, contract: &ContractId) -> Result<bool, RepositoryError> {
        self.inner.delete_contract(contract)
    }

    fn insert_report(&mut self, report: ReportRecord) -> Result<(), RepositoryError> {
        self.inner.insert_report(report)
    }

    fn delete_report(&mut self, contract: &ContractId) -> Result<bool, RepositoryError> {
        self.inner.delete_report(contract)
    }

    fn insert_evidence(&mut self, evidence: Evidence) -> Result<(), RepositoryError> {
        self.inner.insert_evidence(evidence)
    }

    fn delete_evidence(&mut self, contract: &ContractId) -> Result<usize, RepositoryError> {
        self.inner.delete_evidence(contract)
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::TransactionAborted(
                "serialization failure".to_string(),
            ));
        }
        self.inner.commit()
    }
}

impl DepositRepository for FailingCommitRepository {
    fn find_building(&self, id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        self.inner.find_building(id)
    }

    fn find_building_by_key(
        &self,
        key: &BuildingKey,
    ) -> Result<Option<Building>, RepositoryError> {
        self.inner.find_building_by_key(key)
    }

    fn insert_building(&self, building: Building) -> Result<Building, RepositoryError> {
        self.inner.insert_building(building)
    }

    fn update_building(&self, building: Building) -> Result<(), RepositoryError> {
        self.inner.update_building(building)
    }

    fn find_contract_by_tenant(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        self.inner.find_contract_by_tenant(tenant)
    }

    fn find_report_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Option<ReportRecord>, RepositoryError> {
        self.inner.find_report_by_contract(contract)
    }

    fn find_evidence_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        self.inner.find_evidence_by_contract(contract)
    }

    fn insert_evidence(&self, evidence: Evidence) -> Result<(), RepositoryError> {
        self.inner.insert_evidence(evidence)
    }

    fn begin(&self) -> Result<Box<dyn DepositTransaction + '_>, RepositoryError> {
        let fail = *self.fail_commits.lock().expect("flag mutex poisoned");
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin()?,
            fail,
        }))
    }
}

/// Misses the next key lookup, as if another request registered the unit in between.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: InMemoryDepositRepository,
    pub(super) hide_next_lookup: AtomicBool,
}

impl DepositRepository for RacingRepository {
    fn find_building(&self, id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        self.inner.find_building(id)
    }

    fn find_building_by_key(
        &self,
        key: &BuildingKey,
    ) -> Result<Option<Building>, RepositoryError> {
        if self.hide_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_building_by_key(key)
    }

    fn insert_building(&self, building: Building) -> Result<Building, RepositoryError> {
        self.inner.insert_building(building)
    }

    fn update_building(&self, building: Building) -> Result<(), RepositoryError> {
        self.inner.update_building(building)
    }

    fn find_contract_by_tenant(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        self.inner.find_contract_by_tenant(tenant)
    }

    fn find_report_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Option<ReportRecord>, RepositoryError> {
        self.inner.find_report_by_contract(contract)
    }

    fn find_evidence_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        self.inner.find_evidence_by_contract(contract)
    }

    fn insert_evidence(&self, evidence: Evidence) -> Result<(), RepositoryError> {
        self.inner.insert_evidence(evidence)
    }

    fn begin(&self) -> Result<Box<dyn DepositTransaction + '_>, RepositoryError> {
        self.inner.begin()
    }
}

pub(super) struct UnavailableRepository;

impl DepositRepository for UnavailableRepository {
    fn find_building(&self, _id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_building_by_key(
        &self,
        _key: &BuildingKey,
    ) -> Result<Option<Building>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_building(&self, _building: Building) -> Result<Building, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_building(&self, _building: Building) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_contract_by_tenant(
        &self,
        _tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_report_by_contract(
        &self,
        _contract: &ContractId,
    ) -> Result<Option<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_evidence_by_contract(
        &self,
        _contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_evidence(&self, _evidence: Evidence) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn begin(&self) -> Result<Box<dyn DepositTransaction + '_>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn contract_fixture(
    id: &str,
    tenant_id: &TenantId,
    building_id: &BuildingId,
) -> Contract {
    Contract {
        id: ContractId(id.to_string()),
        tenant_id: tenant_id.clone(),
        building_id: building_id.clone(),
        has_lived: true,
        transport_report_date: Some(day(2022, 3, 1)),
        confirmation_date: None,
        has_landlord_intervention: false,
        has_applied_dividend: true,
        deposit: 50_000_000,
        contract_image: None,
        submitted_at: Utc::now(),
    }
}

pub(super) fn building_fixture(lien: Option<NaiveDate>) -> Building {
    Building {
        id: BuildingId("bld-fixture".to_string()),
        name: "순천 중앙 아파트".to_string(),
        key: BuildingKey {
            address: ADDRESS.to_string(),
            dong: "101".to_string(),
            unit: "1203".to_string(),
            area: "84.97".to_string(),
        },
        building_type: BuildingType::Apartment,
        market_price: 310_000_000,
        lien_registration_date: lien,
        collateral_amount: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    deposit_router(Arc::new(service))
}
