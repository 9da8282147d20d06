//! Engine configuration and resolution.
//!
//! Every value resolves as explicit setting > environment variable > default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timing::TimingPolicy;

pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VIDEO_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_LANGUAGE: &str = "English";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
/// Provider allows two requests per minute on the free tier; 31s keeps us under it.
const DEFAULT_COOLDOWN_SECS: u64 = 31;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 120;

/// Settings shared by the task client and the video ingestion state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub vision_model: String,
    pub text_model: String,
    pub video_model: String,
    /// Language every generated text is pinned to.
    pub language: String,
    /// Where downloaded videos are staged before upload.
    pub scratch_dir: PathBuf,
    pub http_timeout: Duration,
    /// Wait between successive generative calls within one pipeline run.
    pub cooldown: Duration,
    /// Status polling for uploaded videos.
    pub poll: TimingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            scratch_dir: std::env::temp_dir(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            poll: TimingPolicy::new(
                Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
                DEFAULT_POLL_MAX_ATTEMPTS,
            ),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with whatever the environment sets.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: resolve_api_key(None),
            vision_model: env_string("A11Y_VISION_MODEL").unwrap_or(defaults.vision_model),
            text_model: env_string("A11Y_TEXT_MODEL").unwrap_or(defaults.text_model),
            video_model: env_string("A11Y_VIDEO_MODEL").unwrap_or(defaults.video_model),
            language: env_string("A11Y_LANGUAGE").unwrap_or(defaults.language),
            scratch_dir: resolve_scratch_dir(None),
            http_timeout: env_secs("A11Y_HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
            cooldown: env_secs("A11Y_COOLDOWN_SECS").unwrap_or(defaults.cooldown),
            poll: TimingPolicy::new(
                env_secs("A11Y_POLL_INTERVAL_SECS").unwrap_or(defaults.poll.interval),
                env_parse::<u32>("A11Y_POLL_MAX_ATTEMPTS").unwrap_or(defaults.poll.max_attempts),
            ),
        }
    }

    /// Same configuration with no waiting at all; for tests and local dry runs.
    pub fn without_delays(mut self) -> Self {
        self.cooldown = Duration::ZERO;
        self.poll.interval = Duration::ZERO;
        self
    }
}

/// Resolve the provider API key.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(key) = explicit {
        return Some(key.to_string());
    }
    env_string("GOOGLE_API_KEY")
}

/// Resolve the scratch directory used for video downloads.
pub fn resolve_scratch_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }
    env_string("A11Y_SCRATCH_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw}: not a valid number");
            None
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_secs)
}
