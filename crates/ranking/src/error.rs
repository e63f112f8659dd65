use storage::error::StorageError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, RankingError>;

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Report {report_id} is already verified")]
    AlreadyVerified { report_id: Uuid },

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("Competition not found: {0}")]
    CompetitionNotFound(Uuid),
}

/// Broken static configuration. Fatal for the criterion it belongs to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown criterion '{0}'")]
    UnknownCriterion(String),

    #[error("criterion '{0}' is registered twice")]
    DuplicateCriterion(String),

    #[error("criterion '{criterion}': band table is empty")]
    EmptyBandTable { criterion: String },

    #[error("criterion '{criterion}': band table must be strictly descending and end at 0%")]
    UnorderedBandTable { criterion: String },

    #[error("criterion '{criterion}': lookup table has no place for value {value}")]
    MissingLookupEntry { criterion: String, value: u32 },

    #[error("criterion '{criterion}': places must be >= 1 (got {place})")]
    InvalidPlace { criterion: String, place: u32 },

    #[error(
        "criterion '{criterion}': pair ({main_unit_id}, {junior_unit_id}) has a junior unit as mentor and a senior unit as mentee"
    )]
    InconsistentPairOrientation {
        criterion: String,
        main_unit_id: Uuid,
        junior_unit_id: Uuid,
    },
}

/// Malformed source data. The offending unit or pair is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("participation entry {entry_id} has neither a main nor a junior unit")]
    EmptyParticipation { entry_id: Uuid },

    #[error("participation entry {entry_id} names main unit {main_unit_id} but no junior unit")]
    MissingJunior { entry_id: Uuid, main_unit_id: Uuid },

    #[error("participation entry {entry_id} pairs unit {unit_id} with itself")]
    SelfPaired { entry_id: Uuid, unit_id: Uuid },

    #[error("unit {unit_id} appears in more than one participation entry (entry {entry_id} ignored)")]
    DuplicateParticipation { entry_id: Uuid, unit_id: Uuid },

    #[error("report {report_id} belongs to competition {actual}, not {expected}")]
    ForeignReport {
        report_id: Uuid,
        expected: Uuid,
        actual: Uuid,
    },
}

/// Why a scorer rejected a payload.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("{0} overflowed")]
    Overflow(&'static str),
}

/// Failure to score one unit's report. Never aborts a batch.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("report payload does not match criterion '{criterion}': {source}")]
    InvalidData {
        criterion: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("criterion '{criterion}': {quantity} is out of range")]
    Overflow {
        criterion: String,
        quantity: &'static str,
    },

    #[error("report is for criterion '{actual}', scorer handles '{expected}'")]
    WrongCriterion { expected: String, actual: String },
}
