//! Output root preparation

use crate::MirrorError;
use std::io::ErrorKind;
use std::path::Path;

/// Deletes `root` if it exists and creates it again, empty
///
/// A previous run's mirror is discarded so the new run starts clean.
/// Failure here is fatal to the run.
pub async fn prepare_output_root(root: &Path) -> Result<(), MirrorError> {
    let setup_error = |source: std::io::Error| MirrorError::Setup {
        path: root.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => tracing::debug!("Removed previous output at {}", root.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(setup_error(e)),
    }

    tokio::fs::create_dir_all(root).await.map_err(setup_error)?;
    tracing::info!("Output directory ready: {}", root.display());

    Ok(())
}
