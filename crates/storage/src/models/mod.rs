pub mod competition;
pub mod participant_unit;
pub mod participation;
pub mod ranking;
pub mod report;

pub use competition::Competition;
pub use participant_unit::ParticipantUnit;
pub use participation::ParticipationEntry;
pub use ranking::{CriterionRanking, CriterionTandemRanking, OverallRanking, OverallTandemRanking};
pub use report::CriterionReport;
