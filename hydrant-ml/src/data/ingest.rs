//! Dataset ingestion — archive download and extraction.

use crate::error::MlError;
use std::path::Path;

/// Downloads the zipped source dataset and extracts it.
pub struct ArchiveFetcher {
    client: reqwest::Client,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Download `url` to `dest`.
    ///
    /// An already-present archive is left alone (re-runs of the pipeline
    /// should not re-download a multi-megabyte file); its size is logged
    /// instead.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<(), MlError> {
        if dest.exists() {
            let size = std::fs::metadata(dest)?.len();
            tracing::info!(path = %dest.display(), size_bytes = size, "archive already present");
            return Ok(());
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MlError::dataset(format!(
                "download of {url} failed with status {}",
                response.status()
            )));
        }
        let bytes = response.bytes().await?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &bytes)?;
        tracing::info!(url, path = %dest.display(), size_bytes = bytes.len(), "downloaded archive");
        Ok(())
    }

    /// Extract a zip archive into `dest_dir`.
    pub fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<(), MlError> {
        let file = std::fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        std::fs::create_dir_all(dest_dir)?;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let outpath = dest_dir.join(entry.name());

            if entry.name().ends_with('/') {
                std::fs::create_dir_all(&outpath)?;
            } else {
                if let Some(parent) = outpath.parent()
                    && !parent.exists()
                {
                    std::fs::create_dir_all(parent)?;
                }
                let mut outfile = std::fs::File::create(&outpath)?;
                std::io::copy(&mut entry, &mut outfile)?;
            }
        }

        tracing::info!(archive = %archive_path.display(), dest = %dest_dir.display(), "extracted archive");
        Ok(())
    }
}
