use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::types::JobId;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write summary file: {0}")]
    Storage(#[from] std::io::Error),

    #[error("sharing is not supported on this platform")]
    SharingUnavailable,

    #[error("failed to open {path}: {message}")]
    Share { path: PathBuf, message: String },
}

/// Writes summaries into the export directory and hands them to the
/// platform opener on request. Exported files are never cleaned up.
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Writes the summary as UTF-8 to `{export_dir}/{id}.txt`, creating the
    /// directory if needed, and returns the path of the written file.
    pub async fn write_summary(&self, id: &JobId, text: &str) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.export_dir).await?;

        let path = self.export_dir.join(format!("{}.txt", id));
        tokio::fs::write(&path, text.as_bytes()).await?;
        info!("Summary written to {}", path.display());

        Ok(path)
    }

    /// Writes the summary and, when asked to share, hands the file to the
    /// platform opener. The capability check happens before any share
    /// attempt; the written file stays on disk either way.
    pub async fn export(
        &self,
        id: &JobId,
        text: &str,
        share: bool,
    ) -> Result<PathBuf, ExportError> {
        let path = self.write_summary(id, text).await?;

        if share {
            if !sharing_available() {
                return Err(ExportError::SharingUnavailable);
            }
            share_file(&path)?;
        }

        Ok(path)
    }
}

/// True when this platform has an opener exported files can be handed to.
pub fn sharing_available() -> bool {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        true
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg("--version").output().is_ok()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        false
    }
}

fn share_file(path: &Path) -> Result<(), ExportError> {
    debug!("Handing {} to the system opener", path.display());

    #[cfg(target_os = "macos")]
    {
        run_opener(Command::new("open").arg(path), path)
    }

    #[cfg(target_os = "windows")]
    {
        run_opener(Command::new("cmd").args(["/C", "start", ""]).arg(path), path)
    }

    #[cfg(target_os = "linux")]
    {
        run_opener(Command::new("xdg-open").arg(path), path)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Err(ExportError::SharingUnavailable)
    }
}

#[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
fn run_opener(command: &mut Command, path: &Path) -> Result<(), ExportError> {
    match command.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(ExportError::Share {
            path: path.to_path_buf(),
            message: format!("opener exited with {}", status),
        }),
        Err(e) => Err(ExportError::Share {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}
