//! The generative task client.
//!
//! Callers always receive text. Fetch, network, status and parse failures are
//! logged and replaced by a fixed fallback, so mutation modules never branch
//! on provider errors.

use std::sync::Arc;

use super::model::{GenerativeModel, Part};
use super::prompts;
use super::GeminiClient;
use crate::config::EngineConfig;
use crate::fetch::{HttpFetcher, MediaFetcher};
use crate::types::{AdaptError, AdaptResult, TaskError, VideoTask};
use crate::video::VideoIngestion;

/// Image description, text simplification, and video text generation.
pub struct GenerativeTasks {
    model: Arc<dyn GenerativeModel>,
    fetcher: Arc<dyn MediaFetcher>,
    config: EngineConfig,
}

impl GenerativeTasks {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        fetcher: Arc<dyn MediaFetcher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            model,
            fetcher,
            config,
        }
    }

    /// Build the production stack: Gemini for generation, HTTP for media.
    pub fn from_config(config: EngineConfig) -> AdaptResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(AdaptError::MissingCredential("GOOGLE_API_KEY"))?;
        let model = Arc::new(GeminiClient::new(api_key, config.http_timeout));
        let fetcher = Arc::new(HttpFetcher::new(config.http_timeout));
        Ok(Self::new(model, fetcher, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Short screen-reader description of the image at `url`.
    pub async fn describe_image(&self, url: &str) -> String {
        match self.try_describe_image(url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Image description failed for {url}: {e}");
                prompts::IMAGE_FALLBACK.to_string()
            }
        }
    }

    async fn try_describe_image(&self, url: &str) -> Result<String, TaskError> {
        let media = self.fetcher.fetch(url).await?;
        let parts = vec![
            Part::text(prompts::image_description(&self.config.language)),
            Part::InlineData {
                mime_type: media.content_type,
                data: media.bytes,
            },
        ];
        Ok(self.model.generate(&self.config.vision_model, parts).await?)
    }

    /// Plain-language rewrite of `text`; the original text on failure.
    pub async fn simplify(&self, text: &str) -> String {
        let prompt = prompts::simplification(&self.config.language, text);
        match self
            .model
            .generate(&self.config.text_model, vec![Part::text(prompt)])
            .await
        {
            Ok(simplified) => simplified,
            Err(e) => {
                tracing::warn!("Text simplification failed, keeping original: {e}");
                text.to_string()
            }
        }
    }

    pub async fn transcribe_video(&self, url: &str) -> String {
        self.video().run(url, VideoTask::Transcription).await.text
    }

    pub async fn describe_video(&self, url: &str) -> String {
        self.video().run(url, VideoTask::AudioDescription).await.text
    }

    /// A video ingestion state machine sharing this client's provider and fetcher.
    pub fn video(&self) -> VideoIngestion {
        VideoIngestion::new(self.model.clone(), self.fetcher.clone(), &self.config)
    }
}
