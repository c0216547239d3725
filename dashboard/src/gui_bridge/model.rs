use mapvalcore::map::Shape;
use mapvalcore::prelude::CoreError;
use mapvalcore::report::FlatRow;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User-facing description of a failed validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunFailure {
    pub message: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunFailure {
    pub fn from_error(err: &anyhow::Error) -> Self {
        let core = err.chain().find_map(|e| e.downcast_ref::<CoreError>());
        match core {
            Some(CoreError::ToolFailed {
                code,
                stdout,
                stderr,
            }) => RunFailure {
                message: format!("validator failed: {err:#}"),
                exit_code: *code,
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            },
            Some(CoreError::ReportMissing(_) | CoreError::Io { .. } | CoreError::ToolSpawn { .. }) => {
                RunFailure {
                    message: format!("required file not found: {err:#}"),
                    ..Default::default()
                }
            }
            _ => RunFailure {
                message: format!("unexpected error: {err:#}"),
                ..Default::default()
            },
        }
    }
}

/// Snapshot of the session served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardModel {
    pub revision: u64,
    pub uploaded_file: Option<String>,
    pub report_version: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<FlatRow>,
    pub selected_row: Option<usize>,
    pub selected_id: Option<String>,
    pub shape_count: usize,
    pub warnings: Vec<String>,
    pub failure: Option<RunFailure>,
    pub status: String,
}

/// Per-session state, owned by the bridge and passed into every handler.
#[derive(Debug, Default)]
pub struct SessionState {
    pub revision: u64,
    pub uploaded_file: Option<PathBuf>,
    pub report_version: Option<String>,
    pub rows: Vec<FlatRow>,
    /// Cached per uploaded file so selections re-render without re-parsing.
    pub shapes: Vec<Shape>,
    pub selected_row: Option<usize>,
    pub selected_id: Option<String>,
    pub warnings: Vec<String>,
    pub failure: Option<RunFailure>,
    pub status: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            status: "Upload a .osm map to start.".into(),
            ..Default::default()
        }
    }

    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Drops results derived from the previous run; the uploaded file stays.
    pub fn clear_results(&mut self) {
        self.report_version = None;
        self.rows.clear();
        self.shapes.clear();
        self.selected_row = None;
        self.selected_id = None;
        self.warnings.clear();
        self.failure = None;
    }

    pub fn snapshot(&self) -> DashboardModel {
        DashboardModel {
            revision: self.revision,
            uploaded_file: self
                .uploaded_file
                .as_ref()
                .map(|p| p.display().to_string()),
            report_version: self.report_version.clone(),
            columns: FlatRow::DISPLAY_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: self.rows.clone(),
            selected_row: self.selected_row,
            selected_id: self.selected_id.clone(),
            shape_count: self.shapes.len(),
            warnings: self.warnings.clone(),
            failure: self.failure.clone(),
            status: self.status.clone(),
        }
    }
}
