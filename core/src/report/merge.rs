use serde::{Deserialize, Serialize};

use crate::report::lookup::RequirementLookup;
use crate::report::model::{ValidationReport, ValidatorResult};
use crate::telemetry::log::LogManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Passed,
    Failed,
}

impl RowStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            RowStatus::Passed => "✅",
            RowStatus::Failed => "❌",
        }
    }
}

/// One display/selection row: a passed validator, or one issue of a failed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub status: RowStatus,
    pub requirement_id: String,
    /// Lookup-derived columns; `None` when the id has no entry or no table was loaded.
    pub category: Option<String>,
    pub requirement: Option<String>,
    pub url: Option<String>,
    pub validator_name: String,
    pub issue_code: String,
    pub message: String,
    pub primitive: String,
    pub severity: String,
    /// Target primitive id as text; empty for passed validators.
    pub target_id: String,
}

impl FlatRow {
    pub const DISPLAY_COLUMNS: [&'static str; 10] = [
        "status",
        "Category",
        "requirement_id",
        "Requirement",
        "URL",
        "validator_name",
        "issue_code",
        "message",
        "primitive",
        "lane_id",
    ];

    /// Cell texts in `DISPLAY_COLUMNS` order.
    pub fn display_cells(&self) -> [String; 10] {
        [
            self.status.glyph().to_string(),
            self.category.clone().unwrap_or_default(),
            self.requirement_id.clone(),
            self.requirement.clone().unwrap_or_default(),
            self.url.clone().unwrap_or_default(),
            self.validator_name.clone(),
            self.issue_code.clone(),
            self.message.clone(),
            self.primitive.clone(),
            self.target_id.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    pub rows: Vec<FlatRow>,
    pub warnings: Vec<String>,
}

/// Flattens the report in nested order and left-joins the lookup table on requirement id.
pub fn merge(report: &ValidationReport, lookup: Option<&RequirementLookup>) -> MergedTable {
    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    let logger = LogManager::new("merge");

    if lookup.is_none() {
        warnings.push("no requirement lookup table; metadata columns left empty".to_string());
    }

    for requirement in &report.requirements {
        let entry = lookup.and_then(|table| table.get(&requirement.id));
        let base = FlatRow {
            status: RowStatus::Passed,
            requirement_id: requirement.id.clone(),
            category: entry.map(|e| e.category.clone()),
            requirement: entry.map(|e| e.requirement.clone()),
            url: entry.map(|e| e.url.clone()),
            validator_name: String::new(),
            issue_code: String::new(),
            message: String::new(),
            primitive: String::new(),
            severity: String::new(),
            target_id: String::new(),
        };

        for validator in &requirement.validators {
            match validator {
                ValidatorResult::Passed { name } => rows.push(FlatRow {
                    validator_name: name.clone(),
                    ..base.clone()
                }),
                ValidatorResult::Failed { name, issues } => {
                    rows.extend(issues.iter().map(|issue| FlatRow {
                        status: RowStatus::Failed,
                        validator_name: name.clone(),
                        issue_code: issue.issue_code.clone(),
                        message: issue.message.clone(),
                        primitive: issue.primitive.clone(),
                        severity: issue.severity.clone(),
                        target_id: issue.id.to_string(),
                        ..base.clone()
                    }))
                }
            }
        }
    }

    logger.record(&format!(
        "report {} -> {} rows from {} requirements",
        report.version,
        rows.len(),
        report.requirements.len()
    ));
    MergedTable { rows, warnings }
}
