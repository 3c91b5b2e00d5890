use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::common::*;
use crate::workflows::deposit::domain::{
    BuildingId, EvidenceCategory, EvidenceSubmission, ReportStatus,
};
use crate::workflows::deposit::repository::{DepositRepository, RepositoryError};
use crate::workflows::deposit::{DepositReportService, DepositServiceError};

#[test]
fn submitting_favorable_contract_completes_report() {
    let (service, repository, building_id) = service_with_building();
    let tenant = tenant("tenant-1");

    let record = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("report stored");

    assert_eq!(record.verdict.status, ReportStatus::Complete);
    assert_eq!(record.verdict.repayment_amount, 20_000_000);

    let contract = repository
        .find_contract_by_tenant(&tenant)
        .expect("store readable")
        .expect("contract saved");
    let evidence = repository
        .find_evidence_by_contract(&contract.id)
        .expect("store readable");
    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].category, EvidenceCategory::ContractImage);
}

#[test]
fn resubmission_replaces_report_instead_of_accumulating() {
    let (service, repository, building_id) = service_with_building();
    let tenant = tenant("tenant-1");

    let first = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("first submit");
    let second = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("second submit");

    assert_ne!(first.report_id, second.report_id);
    assert_eq!(first.contract_id, second.contract_id);
    assert_eq!(first.verdict, second.verdict);

    let reports = repository.reports().expect("store readable");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_id, second.report_id);
    assert_eq!(repository.contract_count().expect("store readable"), 1);

    let evidence = repository
        .find_evidence_by_contract(&second.contract_id)
        .expect("store readable");
    assert_eq!(evidence.len(), 1, "same contract image is registered once");
}

#[test]
fn corrected_facts_produce_new_verdict() {
    let (service, _, building_id) = service_with_building();
    let tenant = tenant("tenant-1");

    let mut submission = contract_submission(&building_id);
    submission.has_landlord_intervention = true;
    let record = service
        .submit_report(&tenant, submission)
        .expect("report stored");
    assert_eq!(record.verdict.status, ReportStatus::Decisioning);

    let record = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("corrected report stored");
    assert_eq!(record.verdict.status, ReportStatus::Complete);

    let view = service
        .get_report(&tenant)
        .expect("report readable")
        .expect("report present");
    assert!(!view.has_landlord_intervention);
    assert_eq!(view.repayment_amount, 20_000_000);
}

#[test]
fn contract_without_evidence_waits_for_documents() {
    let (service, _, building_id) = service_with_building();
    let tenant = tenant("tenant-1");

    let mut submission = contract_submission(&building_id);
    submission.contract_image = None;
    let record = service
        .submit_report(&tenant, submission)
        .expect("report stored");

    assert!(!record.verdict.evidence_submitted);
    assert_eq!(record.verdict.repayment_amount, 0);
    assert_eq!(record.verdict.status, ReportStatus::Decisioning);

    service
        .register_evidence(
            &tenant,
            EvidenceSubmission {
                category: EvidenceCategory::ResidenceProof,
                storage_key: "uploads/residence/tenant-1.pdf".to_string(),
            },
        )
        .expect("evidence registered");

    let record = service.reevaluate(&tenant).expect("re-evaluated");
    assert!(record.verdict.evidence_submitted);
    assert_eq!(record.verdict.status, ReportStatus::Complete);
}

#[test]
fn failed_commit_preserves_prior_report() {
    let repository = Arc::new(FailingCommitRepository::default());
    let service = DepositReportService::new(
        repository.clone(),
        Arc::new(FixedValuation::default()),
        cap_table(),
    );
    let building_id = service
        .submit_building(building_submission())
        .expect("building registers")
        .building_id;
    let tenant = tenant("tenant-1");

    let original = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("initial report");

    repository.arm();
    let mut submission = contract_submission(&building_id);
    submission.deposit = 80_000_000;
    let error = service
        .submit_report(&tenant, submission)
        .expect_err("commit fails");

    assert!(matches!(
        error,
        DepositServiceError::Repository(RepositoryError::TransactionAborted(_))
    ));
    assert!(error.is_retryable());

    let reports = repository.inner.reports().expect("store readable");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_id, original.report_id);

    let view = service
        .get_report(&tenant)
        .expect("report readable")
        .expect("report present");
    assert_eq!(view.deposit, 50_000_000);
    assert_eq!(view.repayment_amount, 20_000_000);
}

#[test]
fn unknown_building_is_reported() {
    let (service, repository, _) = build_service();

    let error = service
        .submit_report(
            &tenant("tenant-1"),
            contract_submission(&BuildingId("bld-missing".to_string())),
        )
        .expect_err("building lookup fails");

    assert!(matches!(
        error,
        DepositServiceError::BuildingNotFound { ref building_id } if building_id == "bld-missing"
    ));
    assert_eq!(repository.contract_count().expect("store readable"), 0);
}

#[test]
fn negative_deposit_never_reaches_the_store() {
    let (service, repository, building_id) = service_with_building();
    let mut submission = contract_submission(&building_id);
    submission.deposit = -1;

    let error = service
        .submit_report(&tenant("tenant-1"), submission)
        .expect_err("intake rejects");

    assert!(matches!(error, DepositServiceError::Intake(_)));
    assert!(!error.is_retryable());
    assert_eq!(repository.contract_count().expect("store readable"), 0);
}

#[test]
fn deleting_without_contract_reports_nothing_to_delete() {
    let (service, repository, building_id) = service_with_building();
    service
        .submit_report(&tenant("tenant-2"), contract_submission(&building_id))
        .expect("other tenant report");

    let error = service
        .delete_report(&tenant("tenant-1"))
        .expect_err("nothing to delete");

    assert!(matches!(error, DepositServiceError::NothingToDelete));
    assert_eq!(repository.contract_count().expect("store readable"), 1);
    assert_eq!(repository.reports().expect("store readable").len(), 1);
}

#[test]
fn delete_removes_contract_report_and_evidence() {
    let (service, repository, building_id) = service_with_building();
    let tenant = tenant("tenant-1");
    let record = service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("report stored");

    service.delete_report(&tenant).expect("deleted");

    assert!(service.get_report(&tenant).expect("readable").is_none());
    assert_eq!(repository.contract_count().expect("store readable"), 0);
    assert!(repository
        .find_evidence_by_contract(&record.contract_id)
        .expect("store readable")
        .is_empty());
    assert_eq!(repository.building_count().expect("store readable"), 1);
}

#[test]
fn reevaluate_requires_a_contract() {
    let (service, _, _) = build_service();

    let error = service
        .reevaluate(&tenant("tenant-1"))
        .expect_err("no contract");

    assert!(matches!(error, DepositServiceError::NoContract));
}

#[test]
fn evidence_requires_a_contract() {
    let (service, _, _) = build_service();

    let error = service
        .register_evidence(
            &tenant("tenant-1"),
            EvidenceSubmission {
                category: EvidenceCategory::Identification,
                storage_key: "uploads/id.png".to_string(),
            },
        )
        .expect_err("no contract");

    assert!(matches!(error, DepositServiceError::NoContract));
}

#[test]
fn existing_building_is_reused_and_lien_refreshed() {
    let (service, repository, valuation) = build_service();
    let first = service
        .submit_building(building_submission())
        .expect("first registration");

    let mut again = building_submission();
    again.area = "84.970".to_string();
    again.lien_registration_date = Some(day(2023, 6, 1));
    let second = service.submit_building(again).expect("second registration");

    assert_eq!(first.building_id, second.building_id);
    assert_eq!(second.lien_registration_date, Some(day(2023, 6, 1)));
    assert_eq!(second.market_price, 310_000_000);
    assert_eq!(valuation.calls(), 1);
    assert_eq!(repository.building_count().expect("store readable"), 1);
}

#[test]
fn missing_confirmation_with_old_lien_still_yields_a_verdict() {
    let (service, _, _) = build_service();
    let mut building = building_submission();
    building.lien_registration_date = Some(day(2008, 1, 1));
    let building_id = service
        .submit_building(building)
        .expect("building registers")
        .building_id;

    let mut submission = contract_submission(&building_id);
    submission.confirmation_date = None;
    let record = service
        .submit_report(&tenant("tenant-1"), submission)
        .expect("verdict despite pre-schedule lien date");

    assert!(!record.verdict.standing);
    assert_eq!(record.verdict.repayment_amount, 0);
    assert_eq!(record.verdict.status, ReportStatus::Decisioning);
}

#[test]
fn concurrent_registration_of_same_unit_updates_instead_of_conflicting() {
    let repository = Arc::new(RacingRepository::default());
    let stored = repository
        .inner
        .insert_building(building_fixture(None))
        .expect("first registration");
    repository.hide_next_lookup.store(true, Ordering::SeqCst);
    let service = DepositReportService::new(
        repository.clone(),
        Arc::new(FixedValuation::default()),
        cap_table(),
    );

    let summary = service
        .submit_building(building_submission())
        .expect("conflict resolves to an update");

    assert_eq!(summary.building_id, stored.id);
    assert_eq!(summary.lien_registration_date, Some(day(2021, 11, 30)));
    assert_eq!(repository.inner.building_count().expect("store readable"), 1);
}

#[test]
fn valuation_outage_is_retryable() {
    let service = DepositReportService::new(
        Arc::new(crate::workflows::deposit::InMemoryDepositRepository::default()),
        Arc::new(OfflineValuation),
        cap_table(),
    );

    let error = service
        .submit_building(building_submission())
        .expect_err("registry offline");

    assert!(matches!(error, DepositServiceError::Valuation(_)));
    assert!(error.is_retryable());
}

#[test]
fn repository_outage_is_retryable() {
    let service = DepositReportService::new(
        Arc::new(UnavailableRepository),
        Arc::new(FixedValuation::default()),
        cap_table(),
    );

    let error = service
        .submit_report(
            &tenant("tenant-1"),
            contract_submission(&BuildingId("bld-1".to_string())),
        )
        .expect_err("store offline");

    assert!(error.is_retryable());
    assert!(matches!(
        error,
        DepositServiceError::Repository(RepositoryError::Unavailable(_))
    ));
}

#[test]
fn report_view_carries_building_and_rationale() {
    let (service, _, building_id) = service_with_building();
    let tenant = tenant("tenant-1");
    service
        .submit_report(&tenant, contract_submission(&building_id))
        .expect("report stored");

    let view = service
        .get_report(&tenant)
        .expect("readable")
        .expect("present");

    assert_eq!(view.building_name, "순천 중앙 아파트");
    assert_eq!(view.address, ADDRESS);
    assert_eq!(view.status, ReportStatus::Complete);
    assert_eq!(view.rationale, "eligible for priority repayment of 20000000");
}

#[test]
fn missing_report_reads_as_none() {
    let (service, _, _) = build_service();
    assert!(service
        .get_report(&tenant("tenant-1"))
        .expect("readable")
        .is_none());
}
