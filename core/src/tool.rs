//! Invocation of the external Lanelet2 map validator.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::prelude::{CoreError, CoreResult, ProjectionMode};
use crate::report::ValidationReport;
use crate::telemetry::log::LogManager;

/// File name the validator writes into its output directory.
pub const REPORT_FILE_NAME: &str = "lanelet2_validation_results.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorCommand {
    pub program: PathBuf,
    /// Rule-set JSON describing the required checks.
    pub requirements: PathBuf,
    pub projection: ProjectionMode,
    pub language: String,
    pub report_file: String,
}

impl ValidatorCommand {
    pub fn new(program: impl Into<PathBuf>, requirements: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            requirements: requirements.into(),
            projection: ProjectionMode::Mgrs,
            language: "ja".into(),
            report_file: REPORT_FILE_NAME.into(),
        }
    }

    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.report_file)
    }

    fn command(&self, map: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(self.projection.as_flag())
            .arg("-l")
            .arg(&self.language)
            .arg("-m")
            .arg(map)
            .arg("-i")
            .arg(&self.requirements)
            .arg("-o")
            .arg(output_dir);
        cmd
    }

    /// Runs the validator on `map` and parses its report.
    ///
    /// `output_dir` is removed and recreated first so a stale report can never be
    /// read back. The call blocks until the process exits; there is no timeout and
    /// no retry.
    pub fn run(&self, map: &Path, output_dir: &Path) -> CoreResult<ValidationReport> {
        let logger = LogManager::new("validator");
        reset_dir(output_dir)?;

        logger.record(&format!("running {:?}", self.command(map, output_dir)));
        let output = self
            .command(map, output_dir)
            .output()
            .map_err(|source| CoreError::ToolSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            logger.warn(&format!(
                "validator exited with {}; stderr: {}",
                output.status,
                stderr.trim()
            ));
            return Err(CoreError::ToolFailed {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        let report = ValidationReport::load(&self.report_path(output_dir))?;
        logger.record(&format!(
            "report {} with {} requirements, {} issues",
            report.version,
            report.requirements.len(),
            report.issue_count()
        ));
        Ok(report)
    }
}

/// Removes `dir` with everything in it and creates it again empty.
pub fn reset_dir(dir: &Path) -> CoreResult<()> {
    let io_err = |source| CoreError::Io {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(io_err)?;
    }
    fs::create_dir_all(dir).map_err(io_err)
}
