use chrono::NaiveDate;
use deposit_guard::error::AppError;
use deposit_guard::workflows::deposit::{
    BuildingDraft, BuildingType, CapTable, ValuationError, ValuationProvider,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Offline stand-in for the building registry: names come from the address and prices from
/// a per-square-meter rate for each building type.
#[derive(Debug, Default, Clone)]
pub(crate) struct EstimatedValuation;

impl EstimatedValuation {
    fn rate_per_square_meter(building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Apartment => 9_000_000.0,
            BuildingType::Officetel => 6_000_000.0,
            BuildingType::Villa => 4_500_000.0,
            BuildingType::MultiFamily => 4_000_000.0,
            BuildingType::Detached => 3_500_000.0,
        }
    }
}

impl ValuationProvider for EstimatedValuation {
    fn lookup_name(&self, address: &str) -> Result<String, ValuationError> {
        let mut tokens = address.split_whitespace().rev();
        match (tokens.next(), tokens.next()) {
            (Some(number), Some(street)) => Ok(format!("{street} {number}")),
            (Some(only), None) => Ok(only.to_string()),
            _ => Err(ValuationError::Unavailable(
                "address has no searchable tokens".to_string(),
            )),
        }
    }

    fn lookup_market_price(&self, building: &BuildingDraft) -> Result<u64, ValuationError> {
        let area: f64 = building.key.area.parse().map_err(|_| {
            ValuationError::Unavailable(format!("area '{}' is not numeric", building.key.area))
        })?;
        let estimate = area * Self::rate_per_square_meter(building.building_type);
        Ok(estimate.round() as u64)
    }
}

/// Cap table from a CSV override, or the statutory schedule when none is configured.
pub(crate) fn load_cap_table(path: Option<&Path>) -> Result<CapTable, AppError> {
    match path {
        Some(path) => {
            let table = CapTable::from_path(path)?;
            info!(path = %path.display(), tiers = table.tiers().len(), "loaded cap table override");
            Ok(table)
        }
        None => Ok(CapTable::statutory()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
