use std::path::Path;

use tokio::process::Command;

use crate::ports::playlist_info::ProviderError;

/// Make sure the listing tool can be found and runs. Returns its reported version.
pub async fn check_installed(binary: &Path) -> Result<String, ProviderError> {
    let resolved = which::which(binary)
        .map_err(|_| ProviderError::CommandNotFound(binary.display().to_string()))?;

    let output = Command::new(&resolved).arg("--version").output().await?;
    if !output.status.success() {
        return Err(ProviderError::CommandFailed {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::debug!(
        binary = %resolved.display(),
        version = %version,
        "Found playlist listing tool",
    );
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_missing_binary() {
        let result = check_installed(Path::new("definitely-not-a-real-yt-dlp")).await;

        assert!(matches!(result, Err(ProviderError::CommandNotFound(_))));
    }
}
