use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Building, BuildingId, BuildingKey, Contract, ContractId, Evidence, TenantId};
use super::repository::{DepositRepository, DepositTransaction, ReportRecord, RepositoryError};

#[derive(Debug, Clone, Default)]
struct StoreState {
    buildings: HashMap<BuildingId, Building>,
    contracts: HashMap<ContractId, Contract>,
    reports: HashMap<ContractId, ReportRecord>,
    evidence: Vec<Evidence>,
}

impl StoreState {
    fn contract_for_tenant(&self, tenant: &TenantId) -> Option<&Contract> {
        self.contracts
            .values()
            .find(|contract| &contract.tenant_id == tenant)
    }

    fn evidence_for(&self, contract: &ContractId) -> Vec<Evidence> {
        self.evidence
            .iter()
            .filter(|evidence| &evidence.contract_id == contract)
            .cloned()
            .collect()
    }
}

/// Mutex-backed repository. A transaction holds the store lock until it is committed or
/// dropped, so replacements are serialized.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDepositRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryDepositRepository {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    /// Every stored report, for diagnostics and demos.
    pub fn reports(&self) -> Result<Vec<ReportRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut reports: Vec<ReportRecord> = guard.reports.values().cloned().collect();
        reports.sort_by(|left, right| left.report_id.cmp(&right.report_id));
        Ok(reports)
    }

    pub fn contract_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.contracts.len())
    }

    pub fn building_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.buildings.len())
    }
}

impl DepositRepository for InMemoryDepositRepository {
    fn find_building(&self, id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        Ok(self.lock()?.buildings.get(id).cloned())
    }

    fn find_building_by_key(
        &self,
        key: &BuildingKey,
    ) -> Result<Option<Building>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .buildings
            .values()
            .find(|building| &building.key == key)
            .cloned())
    }

    fn insert_building(&self, building: Building) -> Result<Building, RepositoryError> {
        let mut guard = self.lock()?;
        let duplicate = guard.buildings.contains_key(&building.id)
            || guard
                .buildings
                .values()
                .any(|existing| existing.key == building.key);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.buildings.insert(building.id.clone(), building.clone());
        Ok(building)
    }

    fn update_building(&self, building: Building) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.buildings.get_mut(&building.id) {
            Some(existing) => {
                *existing = building;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn find_contract_by_tenant(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        Ok(self.lock()?.contract_for_tenant(tenant).cloned())
    }

    fn find_report_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Option<ReportRecord>, RepositoryError> {
        Ok(self.lock()?.reports.get(contract).cloned())
    }

    fn find_evidence_by_contract(
        &self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        Ok(self.lock()?.evidence_for(contract))
    }

    fn insert_evidence(&self, evidence: Evidence) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.contracts.contains_key(&evidence.contract_id) {
            return Err(RepositoryError::NotFound);
        }
        guard.evidence.push(evidence);
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn DepositTransaction + '_>, RepositoryError> {
        let guard = self.lock()?;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, staged }))
    }
}

struct InMemoryTransaction<'a> {
    guard: MutexGuard<'a, StoreState>,
    staged: StoreState,
}

impl DepositTransaction for InMemoryTransaction<'_> {
    fn find_building(&mut self, id: &BuildingId) -> Result<Option<Building>, RepositoryError> {
        Ok(self.staged.buildings.get(id).cloned())
    }

    fn find_contract_by_tenant(
        &mut self,
        tenant: &TenantId,
    ) -> Result<Option<Contract>, RepositoryError> {
        Ok(self.staged.contract_for_tenant(tenant).cloned())
    }

    fn find_evidence_by_contract(
        &mut self,
        contract: &ContractId,
    ) -> Result<Vec<Evidence>, RepositoryError> {
        Ok(self.staged.evidence_for(contract))
    }

    fn save_contract(&mut self, contract: Contract) -> Result<(), RepositoryError> {
        let held_elsewhere = self
            .staged
            .contract_for_tenant(&contract.tenant_id)
            .is_some_and(|existing| existing.id != contract.id);
        if held_elsewhere {
            return Err(RepositoryError::Conflict);
        }
        self.staged.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn delete_contract(&mut self, contract: &ContractId) -> Result<bool, RepositoryError> {
        let removed = self.staged.contracts.remove(contract).is_some();
        if removed {
            self.staged.reports.remove(contract);
            self.staged
                .evidence
                .retain(|evidence| &evidence.contract_id != contract);
        }
        Ok(removed)
    }

    fn insert_report(&mut self, report: ReportRecord) -> Result<(), RepositoryError> {
        if !self.staged.contracts.contains_key(&report.contract_id) {
            return Err(RepositoryError::NotFound);
        }
        if self.staged.reports.contains_key(&report.contract_id) {
            return Err(RepositoryError::Conflict);
        }
        self.staged
            .reports
            .insert(report.contract_id.clone(), report);
        Ok(())
    }

    fn delete_report(&mut self, contract: &ContractId) -> Result<bool, RepositoryError> {
        Ok(self.staged.reports.remove(contract).is_some())
    }

    fn insert_evidence(&mut self, evidence: Evidence) -> Result<(), RepositoryError> {
        if !self.staged.contracts.contains_key(&evidence.contract_id) {
            return Err(RepositoryError::NotFound);
        }
        self.staged.evidence.push(evidence);
        Ok(())
    }

    fn delete_evidence(&mut self, contract: &ContractId) -> Result<usize, RepositoryError> {
        let before = self.staged.evidence.len();
        self.staged
            .evidence
            .retain(|evidence| &evidence.contract_id != contract);
        Ok(before - self.staged.evidence.len())
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let InMemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
