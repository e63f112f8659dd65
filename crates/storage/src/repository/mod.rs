pub mod competition;
pub mod participation;
pub mod ranking;
pub mod report;

pub use competition::CompetitionRepository;
pub use participation::ParticipationRepository;
pub use ranking::RankingRepository;
pub use report::ReportRepository;
