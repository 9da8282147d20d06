//! Video ingestion: download, upload, poll, generate, clean up.
//!
//! A run moves through `Downloading -> Uploading -> Processing -> Active ->
//! Completed`, or drops to `Failed` from any of the first four. The scratch
//! file and the remote asset are released exactly once on every exit path,
//! including when the caller drops the future mid-run.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::fetch::{guess_mime, MediaFetcher};
use crate::generative::{prompts, GenerativeModel, Part};
use crate::timing::TimingPolicy;
use crate::types::{FileState, IngestionError, VideoTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoState {
    Downloading,
    Uploading,
    Processing,
    Active,
    Completed,
    Failed,
}

/// Result of one run. `text` is always usable: the fallback on failure.
#[derive(Debug)]
pub struct IngestionOutcome {
    pub text: String,
    pub state: VideoState,
    pub failure: Option<IngestionError>,
}

/// Turns a video URL into transcript or audio-description text.
pub struct VideoIngestion {
    model: Arc<dyn GenerativeModel>,
    fetcher: Arc<dyn MediaFetcher>,
    model_name: String,
    language: String,
    scratch_dir: PathBuf,
    poll: TimingPolicy,
}

impl VideoIngestion {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        fetcher: Arc<dyn MediaFetcher>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            model,
            fetcher,
            model_name: config.video_model.clone(),
            language: config.language.clone(),
            scratch_dir: config.scratch_dir.clone(),
            poll: config.poll,
        }
    }

    pub fn with_poll(mut self, poll: TimingPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub async fn run(&self, url: &str, task: VideoTask) -> IngestionOutcome {
        let mut held = Held::new(self.model.clone());
        let result = self.drive(url, task, &mut held).await;
        held.release().await;

        match result {
            Ok(text) => {
                held.enter(VideoState::Completed);
                tracing::info!("Video {} ready for {url}", task.label());
                IngestionOutcome {
                    text,
                    state: VideoState::Completed,
                    failure: None,
                }
            }
            Err(e) => {
                held.enter(VideoState::Failed);
                tracing::warn!("Video {} failed for {url}: {e}", task.label());
                IngestionOutcome {
                    text: prompts::VIDEO_FALLBACK.to_string(),
                    state: VideoState::Failed,
                    failure: Some(e),
                }
            }
        }
    }

    async fn drive(
        &self,
        url: &str,
        task: VideoTask,
        held: &mut Held,
    ) -> Result<String, IngestionError> {
        let scratch = self
            .scratch_dir
            .join(format!("a11y-video-{}.tmp", Uuid::new_v4()));
        // Recorded before the download starts so a partial file is still removed.
        held.scratch = Some(scratch.clone());
        let download = self.fetcher.download(url, &scratch).await?;
        let mime_type = download
            .content_type
            .filter(|t| t.starts_with("video/"))
            .unwrap_or_else(|| guess_mime(url, "video/mp4").to_string());
        tracing::debug!(
            "Staged {} bytes of {url} at {}",
            download.bytes_written,
            scratch.display()
        );

        held.enter(VideoState::Uploading);
        let mut file = self
            .model
            .upload_file(&scratch, &mime_type, &display_name(url))
            .await
            .map_err(IngestionError::Upload)?;
        held.asset = Some(file.name.clone());

        held.enter(VideoState::Processing);
        let mut attempts = 0;
        while matches!(
            file.state,
            FileState::Processing | FileState::StateUnspecified
        ) {
            if attempts >= self.poll.max_attempts {
                return Err(IngestionError::PollTimeout { attempts });
            }
            tokio::time::sleep(self.poll.interval).await;
            attempts += 1;
            file = self
                .model
                .get_file(&file.name)
                .await
                .map_err(IngestionError::Poll)?;
            tracing::debug!("Poll {attempts}: {} is {:?}", file.name, file.state);
        }
        if file.state != FileState::Active {
            return Err(IngestionError::NotActive(file.state));
        }

        held.enter(VideoState::Active);
        let prompt = match task {
            VideoTask::Transcription => prompts::transcription(&self.language),
            VideoTask::AudioDescription => prompts::audio_description(&self.language),
        };
        let file_mime = if file.mime_type.is_empty() {
            mime_type
        } else {
            file.mime_type
        };
        let parts = vec![
            Part::text(prompt),
            Part::FileData {
                mime_type: file_mime,
                file_uri: file.uri,
            },
        ];
        self.model
            .generate(&self.model_name, parts)
            .await
            .map_err(IngestionError::Generation)
    }
}

/// Resources a run currently owns.
///
/// `release` frees them on the normal path. If the run future is dropped
/// first, `Drop` removes the scratch file synchronously and hands the remote
/// delete to the runtime.
struct Held {
    model: Arc<dyn GenerativeModel>,
    state: VideoState,
    scratch: Option<PathBuf>,
    asset: Option<String>,
}

impl Held {
    fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            state: VideoState::Downloading,
            scratch: None,
            asset: None,
        }
    }

    fn enter(&mut self, next: VideoState) {
        tracing::debug!("Video ingestion {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn release(&mut self) {
        if let Some(name) = self.asset.take() {
            match self.model.delete_file(&name).await {
                Ok(()) => tracing::debug!("Deleted remote asset {name}"),
                Err(e) => tracing::warn!("Failed to delete remote asset {name}: {e}"),
            }
        }
        if let Some(path) = self.scratch.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
            }
        }
    }
}

impl Drop for Held {
    fn drop(&mut self) {
        if let Some(path) = self.scratch.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {e}", path.display());
                }
            }
        }
        if let Some(name) = self.asset.take() {
            let model = self.model.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = model.delete_file(&name).await {
                            tracing::warn!("Failed to delete abandoned asset {name}: {e}");
                        }
                    });
                }
                Err(_) => tracing::warn!("No runtime left to delete abandoned asset {name}"),
            }
        }
    }
}

fn display_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("a11y-adapt video")
        .to_string()
}
