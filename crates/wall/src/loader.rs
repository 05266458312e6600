//! Asynchronous sticker image loading.
//!
//! Loads are two-phase: `request` starts a fetch, the runner `poll`s for
//! completions and hands them to the session. Nothing is committed to the
//! wall until a load completes, and the session re-checks the id is still
//! wanted at that point.

use crate::registry::ImageHandle;
use protocol::StickerId;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid image url: {0}")]
    Url(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A finished load attempt.
#[derive(Debug)]
pub struct LoadedImage {
    pub id: StickerId,
    pub result: Result<ImageHandle, LoadError>,
}

/// Source of sticker rasters.
pub trait ImageLoader {
    /// Begin loading `path` for the given sticker.
    fn request(&mut self, id: StickerId, path: &str);
    /// Drain completed loads, in completion order.
    fn poll(&mut self) -> Vec<LoadedImage>;
}

/// Fetches images over HTTP and probes their dimensions.
pub struct HttpImageLoader {
    http: reqwest::Client,
    base: Url,
    tx: mpsc::UnboundedSender<LoadedImage>,
    rx: mpsc::UnboundedReceiver<LoadedImage>,
}

impl HttpImageLoader {
    /// `base` resolves relative sticker paths, e.g. `http://host:8000/`.
    pub fn new(base: Url) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            http: reqwest::Client::new(),
            base,
            tx,
            rx,
        }
    }

    async fn fetch(http: reqwest::Client, url: Url) -> Result<ImageHandle, LoadError> {
        let bytes = http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let decoded = image::load_from_memory(&bytes)?;
        Ok(ImageHandle {
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

impl ImageLoader for HttpImageLoader {
    fn request(&mut self, id: StickerId, path: &str) {
        let url = match self.base.join(path) {
            Ok(url) => url,
            Err(e) => {
                // Report through the same channel as fetch failures.
                let _ = self.tx.send(LoadedImage {
                    id,
                    result: Err(e.into()),
                });
                return;
            }
        };

        debug!("Fetching sticker image: {url}");
        let http = self.http.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = Self::fetch(http, url).await;
            let _ = tx.send(LoadedImage { id, result });
        });
    }

    fn poll(&mut self) -> Vec<LoadedImage> {
        let mut done = Vec::new();
        while let Ok(loaded) = self.rx.try_recv() {
            done.push(loaded);
        }
        done
    }
}

/// Loader with hand-fed completions; no I/O. Used by tests and demos.
#[derive(Debug, Default)]
pub struct ManualLoader {
    requested: Vec<(StickerId, String)>,
    completed: Vec<LoadedImage>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths requested so far, oldest first.
    pub fn requests(&self) -> &[(StickerId, String)] {
        &self.requested
    }

    /// Queue a successful completion for the next `poll`.
    pub fn complete(&mut self, id: StickerId, width: u32, height: u32) {
        self.completed.push(LoadedImage {
            id,
            result: Ok(ImageHandle { width, height }),
        });
    }

    /// Queue a failed completion for the next `poll`.
    pub fn fail(&mut self, id: StickerId) {
        self.completed.push(LoadedImage {
            id,
            result: Err(LoadError::Url(url::ParseError::EmptyHost)),
        });
    }
}

impl ImageLoader for ManualLoader {
    fn request(&mut self, id: StickerId, path: &str) {
        self.requested.push((id, path.to_string()));
    }

    fn poll(&mut self) -> Vec<LoadedImage> {
        std::mem::take(&mut self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_loader_tracks_requests_and_completions() {
        let mut loader = ManualLoader::new();
        loader.request("a".into(), "stickers/a.webp");
        assert_eq!(loader.requests().len(), 1);
        assert!(loader.poll().is_empty());

        loader.complete("a".into(), 512, 256);
        let done = loader.poll();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].result.as_ref().unwrap().width, 512);
        assert!(loader.poll().is_empty());
    }
}
