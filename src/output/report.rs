//! Failure report written at the end of a run

use std::path::{Path, PathBuf};

/// Writes one failed URL per line to `<root>/<name>`
///
/// Nothing is written when `failures` is empty.
///
/// # Returns
///
/// * `Ok(Some(path))` - The report was written to `path`
/// * `Ok(None)` - There were no failures to report
/// * `Err(io::Error)` - The report could not be written
pub async fn write_failure_report(
    root: &Path,
    name: &str,
    failures: &[String],
) -> std::io::Result<Option<PathBuf>> {
    if failures.is_empty() {
        return Ok(None);
    }

    let path = root.join(name);
    let mut contents = failures.join("\n");
    contents.push('\n');

    tokio::fs::write(&path, contents).await?;
    tracing::info!(
        "Wrote {} failed URLs to {}",
        failures.len(),
        path.display()
    );

    Ok(Some(path))
}
