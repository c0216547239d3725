use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::prelude::{CoreError, CoreResult};

/// Parsed output of the external map validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub version: String,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub passed: bool,
    pub validators: Vec<ValidatorResult>,
}

/// A single reported violation tied to a map primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub issue_code: String,
    pub message: String,
    pub primitive: String,
    pub severity: String,
}

/// Outcome of one validator. Issues exist only on the failed branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValidatorResult", into = "RawValidatorResult")]
pub enum ValidatorResult {
    Passed { name: String },
    Failed { name: String, issues: Vec<Issue> },
}

impl ValidatorResult {
    pub fn name(&self) -> &str {
        match self {
            ValidatorResult::Passed { name } | ValidatorResult::Failed { name, .. } => name,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, ValidatorResult::Passed { .. })
    }
}

/// Wire shape of a validator record: `issues` keyed by the `passed` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawValidatorResult {
    name: String,
    passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<Issue>>,
}

impl TryFrom<RawValidatorResult> for ValidatorResult {
    type Error = String;

    fn try_from(raw: RawValidatorResult) -> Result<Self, Self::Error> {
        match (raw.passed, raw.issues) {
            (true, Some(issues)) if !issues.is_empty() => Err(format!(
                "validator `{}` passed but reports {} issues",
                raw.name,
                issues.len()
            )),
            (true, _) => Ok(ValidatorResult::Passed { name: raw.name }),
            (false, Some(issues)) => Ok(ValidatorResult::Failed {
                name: raw.name,
                issues,
            }),
            (false, None) => Err(format!("validator `{}` failed without issues", raw.name)),
        }
    }
}

impl From<ValidatorResult> for RawValidatorResult {
    fn from(result: ValidatorResult) -> Self {
        match result {
            ValidatorResult::Passed { name } => RawValidatorResult {
                name,
                passed: true,
                issues: None,
            },
            ValidatorResult::Failed { name, issues } => RawValidatorResult {
                name,
                passed: false,
                issues: Some(issues),
            },
        }
    }
}

impl ValidationReport {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Reads the report written by the validator.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CoreError::ReportMissing(path.to_path_buf())
            } else {
                CoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&text).map_err(|source| CoreError::ReportMalformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn issue_count(&self) -> usize {
        self.requirements
            .iter()
            .flat_map(|r| &r.validators)
            .map(|v| match v {
                ValidatorResult::Passed { .. } => 0,
                ValidatorResult::Failed { issues, .. } => issues.len(),
            })
            .sum()
    }
}
