pub mod criteria;
pub mod engine;
pub mod error;
pub mod overall;
pub mod participation;
pub mod placement;
pub mod rank;
pub mod tandem;

pub use criteria::{CriterionDefinition, CriterionRegistry, Evaluation, RankingModel, TandemPolicy};
pub use engine::{CriterionRecompute, FullRecompute, OverallRecompute, RankingEngine, Verification};
pub use error::{ConfigError, DataIntegrityError, PayloadError, RankingError, Result, ScoringError};
pub use participation::{Pair, ParticipationMode, ParticipationResolver};
pub use rank::{Better, assign_places};
