// ==========================================
// Sponsorship MIS - import report
// ==========================================
// Built fresh for every run and handed back to the caller;
// never written to the database.
// ==========================================

use crate::domain::import::RowError;
use crate::domain::types::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// RowAction - terminal action of one row
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowAction {
    Create,
    Update,
    Skip,
    Failed,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Create => "CREATE",
            RowAction::Update => "UPDATE",
            RowAction::Skip => "SKIP",
            RowAction::Failed => "FAILED",
        }
    }
}

// ==========================================
// RowOutcome - per-row report entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub ordinal: usize,              // data row ordinal (1-based)
    pub sheet_row: usize,            // spreadsheet row number
    pub action: RowAction,
    pub entity_id: Option<i64>,      // id created or updated
    pub natural_key: Option<String>, // rendered key, once known
    pub error: Option<RowError>,
}

impl RowOutcome {
    pub fn created(ordinal: usize, sheet_row: usize, entity_id: i64, key: String) -> Self {
        Self {
            ordinal,
            sheet_row,
            action: RowAction::Create,
            entity_id: Some(entity_id),
            natural_key: Some(key),
            error: None,
        }
    }

    pub fn updated(ordinal: usize, sheet_row: usize, entity_id: i64, key: String) -> Self {
        Self {
            ordinal,
            sheet_row,
            action: RowAction::Update,
            entity_id: Some(entity_id),
            natural_key: Some(key),
            error: None,
        }
    }

    pub fn skipped(ordinal: usize, sheet_row: usize, key: String, error: RowError) -> Self {
        Self {
            ordinal,
            sheet_row,
            action: RowAction::Skip,
            entity_id: None,
            natural_key: Some(key),
            error: Some(error),
        }
    }

    pub fn failed(
        ordinal: usize,
        sheet_row: usize,
        key: Option<String>,
        error: RowError,
    ) -> Self {
        Self {
            ordinal,
            sheet_row,
            action: RowAction::Failed,
            entity_id: None,
            natural_key: key,
            error: Some(error),
        }
    }

    /// Operator-facing line, e.g. `Row 37: could not be saved: ...`
    pub fn error_line(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("Row {}: {}", self.ordinal, e))
    }
}

// ==========================================
// ImportCounts - aggregate per action
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportCounts {
    /// Rows that ended in a successful action (create, update or skip)
    pub fn succeeded(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

// ==========================================
// ImportReport
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub entity: EntityKind,
    pub file_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
    pub aborted: bool,
    pub outcomes: Vec<RowOutcome>, // kept in ordinal order
}

impl ImportReport {
    pub fn new(entity: EntityKind, file_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            entity,
            file_name: file_name.into(),
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
            aborted: false,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = RowOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn counts(&self) -> ImportCounts {
        let mut counts = ImportCounts {
            total: self.outcomes.len(),
            ..ImportCounts::default()
        };
        for outcome in &self.outcomes {
            match outcome.action {
                RowAction::Create => counts.created += 1,
                RowAction::Update => counts.updated += 1,
                RowAction::Skip => counts.skipped += 1,
                RowAction::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(RowOutcome::error_line)
            .collect()
    }

    pub fn outcome(&self, ordinal: usize) -> Option<&RowOutcome> {
        self.outcomes.iter().find(|o| o.ordinal == ordinal)
    }

    pub fn failed_ordinals(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.action == RowAction::Failed)
            .map(|o| o.ordinal)
            .collect()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_aborted(&mut self) {
        self.aborted = true;
        self.finish();
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_error_lines() {
        let mut report = ImportReport::new(EntityKind::Client, "clients.csv");
        report.record(RowOutcome::created(1, 2, 10, "reg_number='A1'".to_string()));
        report.record(RowOutcome::skipped(
            2,
            3,
            "reg_number='A1'".to_string(),
            RowError::DuplicateInBatch {
                key: "reg_number='A1'".to_string(),
                first_ordinal: 1,
            },
        ));
        report.record(RowOutcome::failed(
            3,
            4,
            None,
            RowError::Persistence {
                message: "UNIQUE constraint failed".to_string(),
            },
        ));

        let counts = report.counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.created, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.succeeded(), 2);
        assert_eq!(report.failed_ordinals(), vec![3]);
        assert_eq!(
            report.error_lines()[1],
            "Row 3: could not be saved: UNIQUE constraint failed"
        );
    }

    #[test]
    fn test_report_serializes_actions_upper_case() {
        let mut report = ImportReport::new(EntityKind::Sponsor, "sponsors.xlsx");
        report.record(RowOutcome::updated(1, 2, 4, "email='a@b.org'".to_string()));
        report.mark_aborted();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entity"], "sponsor");
        assert_eq!(json["outcomes"][0]["action"], "UPDATE");
        assert_eq!(json["aborted"], true);
        assert!(report.finished_at.is_some());
    }
}
