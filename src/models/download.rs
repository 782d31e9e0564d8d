//! Streaming model downloads from Hugging Face.

use super::{find, model_path, ModelError};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Download a model by catalog name into the models directory.
///
/// Existing installs are left untouched. A partially written file is
/// removed on failure so a retry starts clean.
pub async fn download(name: &str) -> Result<PathBuf, ModelError> {
    let info = find(name).ok_or_else(|| ModelError::Unknown(name.to_string()))?;
    let output_path = model_path(info)?;

    if output_path.exists() {
        println!("{} is already installed: {}", info.name, output_path.display());
        return Ok(output_path);
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    println!("Downloading {} ({} MB)...", info.name, info.size_mb);
    info!("Fetching {}", info.url);

    let response = reqwest::get(info.url)
        .await
        .map_err(|e| ModelError::Download(format!("Failed to start download: {}", e)))?;

    if !response.status().is_success() {
        return Err(ModelError::Download(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(&output_path)?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = fs::remove_file(&output_path);
                return Err(ModelError::Download(format!(
                    "Failed to read download chunk: {}",
                    e
                )));
            }
        };

        if let Err(e) = file.write_all(&chunk) {
            let _ = fs::remove_file(&output_path);
            return Err(ModelError::Download(format!("Failed to write file: {}", e)));
        }

        downloaded += chunk.len() as u64;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_with_message("Downloaded");

    // Catch truncated transfers when the server announced a length
    if total_size > 0 && downloaded != total_size {
        let _ = fs::remove_file(&output_path);
        return Err(ModelError::Download(format!(
            "Incomplete download: got {} of {} bytes",
            downloaded, total_size
        )));
    }

    println!("Model installed to: {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_model_fails_before_any_network() {
        let result = download("not-a-model").await;
        assert!(matches!(result, Err(ModelError::Unknown(_))));
    }
}
