use anyhow::Context;
use mapvalcore::prelude::{MapConfig, Origin, ProjectionMode};
use mapvalcore::render::FigureStyle;
use mapvalcore::tool::{ValidatorCommand, REPORT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub validator_program: PathBuf,
    pub requirements: PathBuf,
    pub projection: ProjectionMode,
    pub language: String,
    pub report_file: String,
    /// Replaced wholesale on every upload.
    pub upload_dir: PathBuf,
    /// Validator output; recreated before every run.
    pub output_dir: PathBuf,
    pub lookup_table: PathBuf,
    pub chart_size: u32,
    pub origin: Origin,
    pub bind: SocketAddr,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            validator_program: PathBuf::from(
                "/home/autoware/autoware/release_package/autoware_lanelet2_map_validator",
            ),
            requirements: PathBuf::from(
                "/home/autoware/autoware/release_package/map_requirements/pilot-auto/cargo_transport-v2025_6_0.json",
            ),
            projection: ProjectionMode::Mgrs,
            language: "ja".into(),
            report_file: REPORT_FILE_NAME.into(),
            upload_dir: PathBuf::from("uploaded_files"),
            output_dir: PathBuf::from("script_temp_output"),
            lookup_table: PathBuf::from("table.csv"),
            chart_size: 1800,
            origin: Origin::default(),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validator_command(&self) -> ValidatorCommand {
        ValidatorCommand {
            program: self.validator_program.clone(),
            requirements: self.requirements.clone(),
            projection: self.projection,
            language: self.language.clone(),
            report_file: self.report_file.clone(),
        }
    }

    pub fn map_config(&self) -> MapConfig {
        MapConfig {
            origin: self.origin,
            projection: self.projection,
        }
    }

    pub fn figure_style(&self) -> FigureStyle {
        FigureStyle::with_size(self.chart_size)
    }
}
