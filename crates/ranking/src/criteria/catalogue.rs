use rust_decimal::Decimal;

use super::tables::{Band, BandTable};
use super::{
    CriterionDefinition, EventParticipationScorer, LaborEarningsScorer, MembershipFeeScorer,
    OrganizedEventsScorer, PublicityScorer, RankingModel, ReportDelayScorer,
    SafetyViolationsScorer, TandemPolicy, TrainingScorer, WorkDaysScorer,
};
use crate::rank::Better;

// A tandem that never reported its annual report is treated as a year late.
const MISSING_REPORT_DELAY_DAYS: i64 = 365;

pub(super) fn standard_definitions() -> Vec<CriterionDefinition> {
    let membership_fee = MembershipFeeScorer::default();
    let training = TrainingScorer {
        bands: BandTable::new(vec![
            Band::new(50, 1),
            Band::new(40, 2),
            Band::new(30, 3),
            Band::new(20, 4),
            Band::new(10, 5),
            Band::new(0, 6),
        ]),
    };
    let events = EventParticipationScorer::default();
    let safety = SafetyViolationsScorer::default();

    let no_partner_score = TandemPolicy::SumThenRank {
        missing_score: Decimal::ZERO,
    };

    vec![
        CriterionDefinition::new(
            "membership_fee",
            "Membership fee payment",
            Better::Low,
            TandemPolicy::AverageOfPlaces {
                missing_place: membership_fee.bands.worst_place(),
            },
            RankingModel::Both,
            Box::new(membership_fee),
        ),
        CriterionDefinition::new(
            "professional_training",
            "Professional training of members",
            Better::Low,
            TandemPolicy::AverageOfPlaces {
                missing_place: training.bands.worst_place(),
            },
            RankingModel::Both,
            Box::new(training),
        ),
        CriterionDefinition::new(
            "event_participation",
            "Participation in events",
            Better::Low,
            TandemPolicy::AverageOfPlaces {
                missing_place: events.places.worst(),
            },
            RankingModel::Both,
            Box::new(events),
        ),
        CriterionDefinition::new(
            "safety_violations",
            "Absence of safety violations",
            Better::Low,
            TandemPolicy::AverageOfPlaces {
                missing_place: safety.present_place,
            },
            RankingModel::Both,
            Box::new(safety),
        ),
        CriterionDefinition::new(
            "labor_earnings",
            "Labor project earnings per member",
            Better::High,
            no_partner_score,
            RankingModel::Both,
            Box::new(LaborEarningsScorer),
        ),
        CriterionDefinition::new(
            "work_days",
            "Days of work",
            Better::High,
            no_partner_score,
            RankingModel::Both,
            Box::new(WorkDaysScorer),
        ),
        CriterionDefinition::new(
            "organized_events",
            "Organized events",
            Better::High,
            no_partner_score,
            RankingModel::Solo,
            Box::new(OrganizedEventsScorer::default()),
        ),
        CriterionDefinition::new(
            "report_delay",
            "Annual report timeliness",
            Better::Low,
            TandemPolicy::SumThenRank {
                missing_score: Decimal::from(MISSING_REPORT_DELAY_DAYS),
            },
            RankingModel::Tandem,
            Box::new(ReportDelayScorer),
        ),
        CriterionDefinition::new(
            "publicity",
            "Publicity and symbols",
            Better::High,
            no_partner_score,
            RankingModel::Both,
            Box::new(PublicityScorer::default()),
        ),
    ]
}
