use crate::workflow::config::DashboardConfig;
use anyhow::Context;
use mapvalcore::map::{extract_shapes, Shape};
use mapvalcore::report::{load_lookup_or_warn, merge, FlatRow};
use std::path::Path;

pub struct WorkflowResult {
    pub report_version: String,
    pub rows: Vec<FlatRow>,
    pub shapes: Vec<Shape>,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: DashboardConfig,
}

impl Runner {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Validator run, report merge, then geometry extraction for `map_path`.
    pub fn execute(&self, map_path: &Path) -> anyhow::Result<WorkflowResult> {
        let report = self
            .config
            .validator_command()
            .run(map_path, &self.config.output_dir)
            .context("running map validator")?;

        let (lookup, lookup_warning) = load_lookup_or_warn(&self.config.lookup_table);
        let mut table = merge(&report, lookup.as_ref());
        if let Some(warning) = lookup_warning {
            log::warn!("{warning}");
            table.warnings = vec![warning];
        }

        let shapes = extract_shapes(map_path, &self.config.map_config())
            .with_context(|| format!("extracting geometry from {}", map_path.display()))?;

        Ok(WorkflowResult {
            report_version: report.version,
            rows: table.rows,
            shapes,
            warnings: table.warnings,
        })
    }
}
