use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tenant identity as resolved by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvidenceId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingType {
    Apartment,
    Villa,
    Officetel,
    MultiFamily,
    Detached,
}

impl BuildingType {
    pub const fn label(self) -> &'static str {
        match self {
            BuildingType::Apartment => "apartment",
            BuildingType::Villa => "villa",
            BuildingType::Officetel => "officetel",
            BuildingType::MultiFamily => "multi_family",
            BuildingType::Detached => "detached",
        }
    }
}

/// Raw building facts as entered by the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSubmission {
    pub address: String,
    pub dong: String,
    pub unit: String,
    pub area: String,
    pub building_type: BuildingType,
    #[serde(default)]
    pub lien_registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub collateral_amount: Option<i64>,
}

/// Natural key of a physical unit: one row per (address, dong, unit, area).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingKey {
    pub address: String,
    pub dong: String,
    pub unit: String,
    pub area: String,
}

/// Validated building facts, prior to valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingDraft {
    pub key: BuildingKey,
    pub building_type: BuildingType,
    pub lien_registration_date: Option<NaiveDate>,
    pub collateral_amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub key: BuildingKey,
    pub building_type: BuildingType,
    pub market_price: u64,
    /// Date the senior mortgage was recorded.
    pub lien_registration_date: Option<NaiveDate>,
    pub collateral_amount: Option<u64>,
}

impl Building {
    pub fn address(&self) -> &str {
        &self.key.address
    }

    pub fn summary(&self) -> BuildingSummary {
        BuildingSummary {
            building_id: self.id.clone(),
            building_name: self.name.clone(),
            address: self.key.address.clone(),
            dong: self.key.dong.clone(),
            unit: self.key.unit.clone(),
            area: self.key.area.clone(),
            building_type: self.building_type,
            market_price: self.market_price,
            lien_registration_date: self.lien_registration_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building_id: BuildingId,
    pub building_name: String,
    pub address: String,
    pub dong: String,
    pub unit: String,
    pub area: String,
    pub building_type: BuildingType,
    pub market_price: u64,
    pub lien_registration_date: Option<NaiveDate>,
}

/// Lease facts submitted by a tenant. Deposit is signed so negative input can be rejected
/// explicitly rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSubmission {
    pub building_id: BuildingId,
    pub has_lived: bool,
    #[serde(default)]
    pub transport_report_date: Option<NaiveDate>,
    #[serde(default)]
    pub confirmation_date: Option<NaiveDate>,
    pub has_landlord_intervention: bool,
    pub has_applied_dividend: bool,
    pub deposit: i64,
    #[serde(default)]
    pub contract_image: Option<String>,
}

/// Validated lease terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTerms {
    pub building_id: BuildingId,
    pub has_lived: bool,
    pub transport_report_date: Option<NaiveDate>,
    pub confirmation_date: Option<NaiveDate>,
    pub has_landlord_intervention: bool,
    pub has_applied_dividend: bool,
    pub deposit: u64,
    pub contract_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub tenant_id: TenantId,
    pub building_id: BuildingId,
    pub has_lived: bool,
    pub transport_report_date: Option<NaiveDate>,
    pub confirmation_date: Option<NaiveDate>,
    pub has_landlord_intervention: bool,
    pub has_applied_dividend: bool,
    pub deposit: u64,
    pub contract_image: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Contract {
    pub fn from_terms(
        id: ContractId,
        tenant_id: TenantId,
        terms: ContractTerms,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            building_id: terms.building_id,
            has_lived: terms.has_lived,
            transport_report_date: terms.transport_report_date,
            confirmation_date: terms.confirmation_date,
            has_landlord_intervention: terms.has_landlord_intervention,
            has_applied_dividend: terms.has_applied_dividend,
            deposit: terms.deposit,
            contract_image: terms.contract_image,
            submitted_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    ContractImage,
    ResidenceProof,
    Identification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    pub category: EvidenceCategory,
    pub storage_key: String,
}

/// Proof attached to a contract. Only its existence feeds the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub tenant_id: TenantId,
    pub contract_id: ContractId,
    pub category: EvidenceCategory,
    pub storage_key: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Decisioning,
    Complete,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Decisioning => "decisioning",
            ReportStatus::Complete => "complete",
        }
    }
}
