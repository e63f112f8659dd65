use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{CriterionScorer, Evaluation, decode};
use crate::error::PayloadError;

#[derive(Debug, Deserialize)]
struct LaborProject {
    #[serde(default)]
    earnings: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LaborEarningsData {
    members_total: u32,
    projects: Vec<LaborProject>,
}

/// Project earnings per member, rounded to kopecks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaborEarningsScorer;

impl CriterionScorer for LaborEarningsScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: LaborEarningsData = decode(data)?;
        if data.members_total == 0 {
            return Ok(Evaluation::Score(Decimal::ZERO));
        }

        let earnings = data
            .projects
            .iter()
            .try_fold(Decimal::ZERO, |total, project| total.checked_add(project.earnings))
            .ok_or(PayloadError::Overflow("total earnings"))?;
        let per_member = earnings / Decimal::from(data.members_total);
        Ok(Evaluation::Score(per_member.round_dp(2)))
    }
}

#[derive(Debug, Deserialize)]
struct WorkPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl WorkPeriod {
    /// Inclusive length in days; an inverted range counts as zero.
    fn days(&self) -> i64 {
        if self.end < self.start {
            return 0;
        }
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkDaysData {
    periods: Vec<WorkPeriod>,
}

/// Total days worked across all reported work periods.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkDaysScorer;

impl CriterionScorer for WorkDaysScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: WorkDaysData = decode(data)?;
        let days: i64 = data.periods.iter().map(WorkPeriod::days).sum();
        Ok(Evaluation::Score(Decimal::from(days)))
    }
}
