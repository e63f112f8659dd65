mod common;

use ranking::criteria::MembershipFeeScorer;
use ranking::criteria::tables::BandTable;
use ranking::{
    Better, ConfigError, CriterionDefinition, CriterionRegistry, DataIntegrityError, RankingError,
    RankingModel, TandemPolicy,
};
use rust_decimal_macros::dec;
use serde_json::json;
use storage::CompetitionStore;
use storage::models::{CriterionReport, ParticipationEntry};
use uuid::Uuid;

use common::Fixture;

#[tokio::test]
async fn verification_scores_the_report_and_ranks_the_unit() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(
            unit,
            "work_days",
            json!({ "periods": [{ "start": "2025-06-01", "end": "2025-06-30" }] }),
        )
        .await;

    let before = fx
        .engine
        .recompute_criterion(fx.competition_id, "work_days")
        .await
        .unwrap();
    assert_eq!(before.solo_rows, 0);

    let verification = fx
        .engine
        .verify_report(fx.competition_id, report_id)
        .await
        .unwrap();
    assert_eq!(verification.criterion, "work_days");
    assert_eq!(verification.score, dec!(30));
    assert_eq!(verification.recompute.unwrap().solo_rows, 1);

    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(stored.verified);
    assert_eq!(stored.score, Some(dec!(30)));
}

#[tokio::test]
async fn second_verification_is_an_error() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(unit, "report_delay", json!({ "due_on": "2025-01-15", "submitted_on": "2025-01-17" }))
        .await;

    fx.engine
        .verify_report(fx.competition_id, report_id)
        .await
        .unwrap();
    let again = fx.engine.verify_report(fx.competition_id, report_id).await;

    assert!(matches!(
        again,
        Err(RankingError::AlreadyVerified { report_id: id }) if id == report_id
    ));
    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert_eq!(stored.score, Some(dec!(2)));
}

#[tokio::test]
async fn place_criteria_store_the_place_as_score() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(unit, "safety_violations", json!({ "violations": "absent" }))
        .await;

    let verification = fx
        .engine
        .verify_report(fx.competition_id, report_id)
        .await
        .unwrap();
    assert_eq!(verification.score, dec!(1));
}

#[tokio::test]
async fn report_of_another_competition_is_rejected() {
    let fx = Fixture::new().await;
    let elsewhere = Uuid::new_v4();
    let report = CriterionReport::submitted(elsewhere, Uuid::new_v4(), "work_days", json!({}));
    let report_id = report.report_id;
    fx.store.insert_report(report).await;

    let result = fx.engine.verify_report(fx.competition_id, report_id).await;
    assert!(matches!(
        result,
        Err(RankingError::DataIntegrity(DataIntegrityError::ForeignReport { actual, .. }))
            if actual == elsewhere
    ));
    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(!stored.verified);
}

#[tokio::test]
async fn unscorable_report_stays_unverified() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(unit, "labor_earnings", json!({ "projects": 12 }))
        .await;

    let result = fx.engine.verify_report(fx.competition_id, report_id).await;
    assert!(matches!(result, Err(RankingError::Scoring(_))));

    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(!stored.verified);
    assert_eq!(stored.score, None);
}

#[tokio::test]
async fn missing_report_is_not_found() {
    let fx = Fixture::new().await;
    let report_id = Uuid::new_v4();

    assert!(matches!(
        fx.engine.verify_report(fx.competition_id, report_id).await,
        Err(RankingError::ReportNotFound(id)) if id == report_id
    ));
}

#[tokio::test]
async fn broken_configuration_leaves_the_report_unverified() {
    let registry = CriterionRegistry::new(vec![CriterionDefinition::new(
        "membership_fee",
        "Membership fee payment",
        Better::Low,
        TandemPolicy::AverageOfPlaces { missing_place: 20 },
        RankingModel::Both,
        Box::new(MembershipFeeScorer {
            bands: BandTable::new(Vec::new()),
        }),
    )])
    .unwrap();
    let fx = Fixture::with_registry(registry).await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(unit, "membership_fee", json!({ "members_total": 20, "members_paid": 20 }))
        .await;

    for _ in 0..2 {
        let result = fx.engine.verify_report(fx.competition_id, report_id).await;
        assert!(matches!(
            result,
            Err(RankingError::Config(ConfigError::EmptyBandTable { .. }))
        ));
    }

    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(!stored.verified);
    assert_eq!(stored.score, None);
    assert!(fx.store.criterion_rankings(fx.competition_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn inverted_pair_blocks_verification() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let young_mentor = fx.junior("Young mentor").await;
    let old_mentee = fx.senior("Old mentee").await;
    fx.store
        .insert_participation(ParticipationEntry::tandem(fx.competition_id, young_mentor, old_mentee))
        .await;
    let report_id = fx.submitted(unit, "work_days", json!({})).await;

    let result = fx.engine.verify_report(fx.competition_id, report_id).await;
    assert!(matches!(
        result,
        Err(RankingError::Config(ConfigError::InconsistentPairOrientation { .. }))
    ));

    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(!stored.verified);
}

#[tokio::test]
async fn failed_rebuild_is_reported_alongside_the_verification() {
    let fx = Fixture::new().await;
    let unit = fx.solo("Unit").await;
    let report_id = fx
        .submitted(
            unit,
            "work_days",
            json!({ "periods": [{ "start": "2025-06-01", "end": "2025-06-10" }] }),
        )
        .await;
    fx.store.fail_writes(true);

    let verification = fx
        .engine
        .verify_report(fx.competition_id, report_id)
        .await
        .unwrap();
    assert_eq!(verification.score, dec!(10));
    let failure = verification.recompute.unwrap_err();
    assert_eq!(failure.criterion, "work_days");

    let stored = fx.store.find_report(report_id).await.unwrap().unwrap();
    assert!(stored.verified);
    assert_eq!(stored.score, Some(dec!(10)));

    fx.store.fail_writes(false);
    let summary = fx
        .engine
        .recompute_criterion(fx.competition_id, "work_days")
        .await
        .unwrap();
    assert_eq!(summary.solo_rows, 1);
}
