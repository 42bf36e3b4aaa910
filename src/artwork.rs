use crate::{Result, RipError};
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::path::{Path, PathBuf};

/// Saves an album's cover image next to its downloads.
///
/// Persisting is best effort: the caller always gets control back, and the
/// only trace of a failure is a warning in the log.
pub struct ArtworkPersister<'a> {
    client: &'a dyn HttpClient,
    filename: &'a str,
}

impl<'a> ArtworkPersister<'a> {
    pub fn new(client: &'a dyn HttpClient, filename: &'a str) -> Self {
        Self { client, filename }
    }

    /// Fetch `cover_reference` and write it into `destination_dir`.
    ///
    /// Returns the written file, or `None` if anything went wrong.
    pub async fn persist(&self, cover_reference: &str, destination_dir: &Path) -> Option<PathBuf> {
        match self.try_persist(cover_reference, destination_dir).await {
            Ok(path) => {
                log::info!("Saved album cover to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Failed to save album cover image: {e}");
                None
            }
        }
    }

    /// The fallible part of [`persist`](Self::persist).
    ///
    /// `destination_dir` is created with a plain, non-recursive create: an
    /// existing directory or a missing parent is an error.
    pub async fn try_persist(&self, cover_reference: &str, destination_dir: &Path) -> Result<PathBuf> {
        let bytes = self.fetch(cover_reference).await?;

        std::fs::create_dir(destination_dir).map_err(|e| {
            RipError::Artwork(format!(
                "Failed to create {}: {e}",
                destination_dir.display()
            ))
        })?;

        let path = destination_dir.join(self.filename);
        std::fs::write(&path, &bytes)?;
        Ok(path)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let url = url
            .parse::<Url>()
            .map_err(|e| RipError::Artwork(format!("Invalid cover URL '{url}': {e}")))?;

        log::debug!("Fetching cover art from {url}");
        let request = Request::new(Method::Get, url);
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| RipError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RipError::Artwork(format!(
                "Cover request returned {}",
                response.status()
            )));
        }

        response
            .body_bytes()
            .await
            .map_err(|e| RipError::Http(e.to_string()))
    }
}
