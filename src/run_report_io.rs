//! Save and load run reports (`RunResult` as pretty JSON).

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::error::RunReportError;
use crate::types::RunResult;

/// Default filename for a run report under a run directory.
pub const RUN_REPORT_FILENAME: &str = "run_result.json";

/// Loads a run report from `path`.
pub fn load_run_result(path: &Path) -> Result<RunResult, RunReportError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

/// Writes `result` to `path`, creating the parent directory if needed.
#[instrument(level = "trace", skip(result), fields(run_id = %result.run_id))]
pub fn save_run_result(path: &Path, result: &RunResult) -> Result<(), RunReportError> {
  let json = serde_json::to_string_pretty(result)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Writes `result` to `<runs_dir>/<run_id>/run_result.json` and returns that path.
pub fn save_run_result_in(runs_dir: &Path, result: &RunResult) -> Result<PathBuf, RunReportError> {
  let path = runs_dir
    .join(result.run_id.to_string())
    .join(RUN_REPORT_FILENAME);
  save_run_result(&path, result)?;
  Ok(path)
}
