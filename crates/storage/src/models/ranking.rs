use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Solo unit's place for one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CriterionRanking {
    pub competition_id: Uuid,
    pub criterion: String,
    pub unit_id: Uuid,
    pub place: i32,
}

/// Tandem pair's place for one criterion. Averaged places keep two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CriterionTandemRanking {
    pub competition_id: Uuid,
    pub criterion: String,
    pub main_unit_id: Uuid,
    pub junior_unit_id: Uuid,
    pub place: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OverallRanking {
    pub competition_id: Uuid,
    pub unit_id: Uuid,
    pub places_sum: Decimal,
    pub place: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OverallTandemRanking {
    pub competition_id: Uuid,
    pub main_unit_id: Uuid,
    pub junior_unit_id: Uuid,
    pub places_sum: Decimal,
    pub place: i32,
}
