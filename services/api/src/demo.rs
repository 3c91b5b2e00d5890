use crate::infra::{load_cap_table, parse_date, EstimatedValuation};
use chrono::{Local, NaiveDate};
use clap::Args;
use deposit_guard::error::AppError;
use deposit_guard::workflows::deposit::{
    BuildingId, BuildingSubmission, BuildingType, CapTable, ContractSubmission,
    DepositReportService, EvidenceCategory, EvidenceSubmission, InMemoryDepositRepository,
    RegionClass, TenantId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Building address used for every sample tenant.
    #[arg(long, default_value = "서울특별시 관악구 봉천로 227")]
    pub(crate) address: String,
    /// Fixed-date confirmation for the sample leases (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) confirmation_date: Option<NaiveDate>,
    /// Optional CSV cap table replacing the statutory schedule.
    #[arg(long)]
    pub(crate) cap_table: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CapsArgs {
    /// Resolve the tier for this address instead of listing every tier.
    #[arg(long)]
    pub(crate) address: Option<String>,
    /// Reference date for the lookup (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Optional CSV cap table replacing the statutory schedule.
    #[arg(long)]
    pub(crate) cap_table: Option<PathBuf>,
}

pub(crate) fn run_cap_lookup(args: CapsArgs) -> Result<(), AppError> {
    let CapsArgs {
        address,
        date,
        cap_table,
    } = args;
    let table = load_cap_table(cap_table.as_deref())?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let Some(address) = address else {
        render_tiers(&table);
        return Ok(());
    };

    let caps = table.resolve_cap(&address, date)?;
    println!("{address} as of {date}");
    println!(
        "- region {} (tier effective {})",
        caps.region, caps.effective_from
    );
    println!("- protected deposit up to {}", caps.max_protected_deposit);
    println!("- priority repayment up to {}", caps.max_priority_repayment);
    Ok(())
}

fn render_tiers(table: &CapTable) {
    println!("Statutory cap tiers");
    for region in [
        RegionClass::Seoul,
        RegionClass::OvercrowdingControlZone,
        RegionClass::MetropolitanCity,
        RegionClass::Other,
    ] {
        println!("{region}:");
        for tier in table.tiers().iter().filter(|tier| tier.region == region) {
            let until = tier
                .effective_to
                .map(|date| date.to_string())
                .unwrap_or_else(|| "present".to_string());
            println!(
                "  - {} .. {}: protected {} | priority {}",
                tier.effective_from, until, tier.max_protected_deposit, tier.max_priority_repayment
            );
        }
    }
}

struct SampleTenant {
    name: &'static str,
    deposit: i64,
    landlord_intervened: bool,
    contract_image: bool,
}

const SAMPLE_TENANTS: &[SampleTenant] = &[
    SampleTenant {
        name: "tenant-a",
        deposit: 50_000_000,
        landlord_intervened: false,
        contract_image: true,
    },
    SampleTenant {
        name: "tenant-b",
        deposit: 50_000_000,
        landlord_intervened: true,
        contract_image: true,
    },
    SampleTenant {
        name: "tenant-c",
        deposit: 300_000_000,
        landlord_intervened: false,
        contract_image: true,
    },
    SampleTenant {
        name: "tenant-d",
        deposit: 50_000_000,
        landlord_intervened: false,
        contract_image: false,
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        address,
        confirmation_date,
        cap_table,
    } = args;
    let confirmation_date = confirmation_date.unwrap_or_else(|| Local::now().date_naive());
    let caps = load_cap_table(cap_table.as_deref())?;

    println!("Deposit protection demo");
    let repository = Arc::new(InMemoryDepositRepository::default());
    let service = DepositReportService::new(repository.clone(), Arc::new(EstimatedValuation), caps);

    match service.resolve_cap(&address, confirmation_date) {
        Ok(caps) => println!(
            "- {} tier as of {}: protected up to {} | priority up to {}",
            caps.region, confirmation_date, caps.max_protected_deposit, caps.max_priority_repayment
        ),
        Err(err) => {
            println!("  Cap lookup failed: {err}");
            return Ok(());
        }
    }

    let mut building_ids: Vec<BuildingId> = Vec::new();
    for (index, _) in SAMPLE_TENANTS.iter().enumerate() {
        let submission = BuildingSubmission {
            address: address.clone(),
            dong: String::new(),
            unit: format!("{}", 201 + index),
            area: "42.5".to_string(),
            building_type: BuildingType::Villa,
            lien_registration_date: None,
            collateral_amount: None,
        };
        match service.submit_building(submission) {
            Ok(summary) => {
                println!(
                    "- Registered {} unit {} ({}) valued at {}",
                    summary.building_name, summary.unit, summary.building_id.0, summary.market_price
                );
                building_ids.push(summary.building_id);
            }
            Err(err) => {
                println!("  Building rejected: {err}");
                return Ok(());
            }
        }
    }

    println!("\nVerdicts");
    for (sample, building_id) in SAMPLE_TENANTS.iter().zip(&building_ids) {
        let tenant = TenantId(sample.name.to_string());
        let submission = ContractSubmission {
            building_id: building_id.clone(),
            has_lived: true,
            transport_report_date: Some(confirmation_date),
            confirmation_date: Some(confirmation_date),
            has_landlord_intervention: sample.landlord_intervened,
            has_applied_dividend: true,
            deposit: sample.deposit,
            contract_image: sample
                .contract_image
                .then(|| format!("contracts/{}.jpg", sample.name)),
        };

        match service.submit_report(&tenant, submission) {
            Ok(record) => {
                println!(
                    "- {} (deposit {}): {} -> {}",
                    sample.name,
                    sample.deposit,
                    record.verdict.status.label(),
                    record.verdict.summary()
                );
                for component in &record.verdict.components {
                    let mark = if component.passed { "pass" } else { "fail" };
                    println!("    {} [{}]: {}", component.gate.label(), mark, component.notes);
                }
            }
            Err(err) => println!("- {} rejected: {}", sample.name, err),
        }
    }

    let pending = TenantId("tenant-d".to_string());
    println!("\nLate evidence for {}", pending.0);
    let evidence = EvidenceSubmission {
        category: EvidenceCategory::ResidenceProof,
        storage_key: "residence/tenant-d.pdf".to_string(),
    };
    match service
        .register_evidence(&pending, evidence)
        .and_then(|_| service.reevaluate(&pending))
    {
        Ok(record) => println!(
            "- re-evaluated: {} -> {}",
            record.verdict.status.label(),
            record.verdict.summary()
        ),
        Err(err) => println!("- re-evaluation failed: {err}"),
    }

    println!("\nWithdrawals");
    for name in ["tenant-b", "tenant-z"] {
        match service.delete_report(&TenantId(name.to_string())) {
            Ok(()) => println!("- {name}: report and contract removed"),
            Err(err) => println!("- {name}: {err}"),
        }
    }

    match repository.reports() {
        Ok(reports) => println!("\n{} reports on file", reports.len()),
        Err(err) => println!("\nReport listing unavailable: {err}"),
    }

    Ok(())
}
