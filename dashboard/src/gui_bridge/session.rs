//! Handlers driving a single dashboard session.
//!
//! Each handler takes the session state explicitly so the HTTP bridge and the
//! offline driver share the same transitions.

use crate::gui_bridge::model::{RunFailure, SessionState};
use crate::workflow::runner::Runner;
use crate::workflow::uploads::UploadStore;
use anyhow::{bail, Result};
use mapvalcore::render::{render, Figure, FigureStyle};
use mapvalcore::selection::{resolve_target, selection_label};
use mapvalcore::telemetry::MetricsRecorder;

/// Stores an uploaded map, replacing any previous one, and validates it.
pub fn upload(
    state: &mut SessionState,
    runner: &Runner,
    uploads: &UploadStore,
    metrics: &MetricsRecorder,
    file_name: &str,
    bytes: &[u8],
) -> Result<()> {
    let path = uploads.replace(file_name, bytes)?;
    state.clear_results();
    state.uploaded_file = Some(path);
    rerun(state, runner, metrics);
    Ok(())
}

/// Runs the workflow again for the current upload. Failures are recorded on
/// the state rather than returned.
pub fn rerun(state: &mut SessionState, runner: &Runner, metrics: &MetricsRecorder) {
    let Some(path) = state.uploaded_file.clone() else {
        state.status = "No map uploaded.".into();
        state.touch();
        return;
    };

    state.clear_results();
    match runner.execute(&path) {
        Ok(result) => {
            log::info!(
                "validated {} -> {} rows, {} shapes",
                path.display(),
                result.rows.len(),
                result.shapes.len()
            );
            state.status = format!(
                "Validated {} ({} rows, report version {}).",
                path.display(),
                result.rows.len(),
                result.report_version
            );
            state.report_version = Some(result.report_version);
            state.rows = result.rows;
            state.shapes = result.shapes;
            state.warnings = result.warnings;
            metrics.record_run(true);
        }
        Err(err) => {
            log::error!("validation of {} failed: {err:#}", path.display());
            let failure = RunFailure::from_error(&err);
            state.status = failure.message.clone();
            state.failure = Some(failure);
            metrics.record_run(false);
        }
    }
    state.touch();
}

/// Selects a table row, or clears the selection with `None`.
pub fn select(state: &mut SessionState, metrics: &MetricsRecorder, row: Option<usize>) -> Result<()> {
    match row {
        Some(index) => {
            let Some(flat) = state.rows.get(index) else {
                bail!("row {index} out of range ({} rows)", state.rows.len());
            };
            state.selected_id = resolve_target(flat);
            state.selected_row = Some(index);
            metrics.record_selection();
        }
        None => {
            state.selected_row = None;
            state.selected_id = None;
        }
    }
    state.status = selection_label(state.selected_id.as_deref());
    state.touch();
    Ok(())
}

/// Removes the uploaded file and resets every derived view.
pub fn delete(state: &mut SessionState, uploads: &UploadStore) -> Result<()> {
    uploads.clear()?;
    log::info!("cleared uploads in {}", uploads.dir().display());
    let revision = state.revision;
    *state = SessionState::new();
    state.revision = revision;
    state.status = "Uploaded map deleted.".into();
    state.touch();
    Ok(())
}

pub fn figure(state: &SessionState, style: &FigureStyle) -> Figure {
    render(&state.shapes, state.selected_id.as_deref(), style)
}
