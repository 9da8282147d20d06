//! In-process stand-ins for the generative provider and the media fetcher.
//!
//! Used by this crate's tests and by downstream crates that want to drive the
//! pipeline without network access.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::fetch::{Download, FetchedMedia, MediaFetcher};
use crate::generative::{GenerativeModel, GenerativeTasks, Part};
use crate::types::{FetchError, FileState, GenerationError, RemoteFile};

/// Task client over the given fakes with every delay set to zero.
pub fn offline_tasks(model: Arc<ScriptedModel>, fetcher: StaticFetcher) -> GenerativeTasks {
    GenerativeTasks::new(
        model,
        Arc::new(fetcher),
        EngineConfig::default().without_delays(),
    )
}

/// A [`GenerativeModel`] that answers from a script and records every call.
///
/// Uploads start in [`FileState::Processing`]; each `get_file` pops the next
/// scripted state and repeats the last one once the queue runs dry
/// (`Active` when nothing was scripted).
pub struct ScriptedModel {
    reply: Option<String>,
    upload_fails: bool,
    delete_fails: bool,
    log: Mutex<ScriptLog>,
}

#[derive(Default)]
struct ScriptLog {
    poll_states: VecDeque<FileState>,
    last_state: Option<FileState>,
    requests: Vec<(String, Vec<Part>)>,
    live: Vec<String>,
    deleted: Vec<String>,
    uploads: u32,
    polls: u32,
}

impl ScriptedModel {
    /// Every `generate` call answers `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            upload_fails: false,
            delete_fails: false,
            log: Mutex::new(ScriptLog::default()),
        }
    }

    /// Every `generate` call fails with a 500.
    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn with_upload_failure(mut self) -> Self {
        self.upload_fails = true;
        self
    }

    pub fn with_delete_failure(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    /// States reported by successive `get_file` calls.
    pub fn with_poll_states(self, states: impl IntoIterator<Item = FileState>) -> Self {
        self.lock().poll_states = states.into_iter().collect();
        self
    }

    fn lock(&self) -> MutexGuard<'_, ScriptLog> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prompt parts of every `generate` call, in order.
    pub fn requests(&self) -> Vec<Vec<Part>> {
        self.lock().requests.iter().map(|(_, p)| p.clone()).collect()
    }

    /// Model name passed to every `generate` call, in order.
    pub fn models_used(&self) -> Vec<String> {
        self.lock().requests.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Uploaded files that were never deleted.
    pub fn live_files(&self) -> Vec<String> {
        self.lock().live.clone()
    }

    pub fn deleted_files(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    pub fn uploads(&self) -> u32 {
        self.lock().uploads
    }

    pub fn polls(&self) -> u32 {
        self.lock().polls
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String, GenerationError> {
        self.lock().requests.push((model.to_string(), parts));
        self.reply.clone().ok_or_else(|| GenerationError::Status {
            status: 500,
            body: "scripted failure".into(),
        })
    }

    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        _display_name: &str,
    ) -> Result<RemoteFile, GenerationError> {
        if !path.exists() {
            return Err(GenerationError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        if self.upload_fails {
            return Err(GenerationError::Status {
                status: 503,
                body: "scripted upload failure".into(),
            });
        }
        let mut log = self.lock();
        log.uploads += 1;
        let name = format!("files/scripted-{}", log.uploads);
        log.live.push(name.clone());
        Ok(RemoteFile {
            uri: format!("https://files.test/{name}"),
            name,
            mime_type: mime_type.to_string(),
            state: FileState::Processing,
        })
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, GenerationError> {
        let mut log = self.lock();
        if !log.live.iter().any(|n| n == name) {
            return Err(GenerationError::Status {
                status: 404,
                body: format!("{name} not found"),
            });
        }
        log.polls += 1;
        let state = match log.poll_states.pop_front() {
            Some(state) => state,
            None => log.last_state.unwrap_or(FileState::Active),
        };
        log.last_state = Some(state);
        Ok(RemoteFile {
            name: name.to_string(),
            uri: format!("https://files.test/{name}"),
            mime_type: String::new(),
            state,
        })
    }

    async fn delete_file(&self, name: &str) -> Result<(), GenerationError> {
        let mut log = self.lock();
        log.deleted.push(name.to_string());
        if self.delete_fails {
            return Err(GenerationError::Status {
                status: 500,
                body: "scripted delete failure".into(),
            });
        }
        log.live.retain(|n| n != name);
        Ok(())
    }
}

/// A [`MediaFetcher`] serving fixed bodies; unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    resources: HashMap<String, (Vec<u8>, String)>,
    broken: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>, content_type: &str) -> Self {
        self.resources
            .insert(url.to_string(), (bytes, content_type.to_string()));
        self
    }

    /// Downloads of `url` write part of the body, then fail mid-stream.
    pub fn with_broken_download(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    /// Every URL fetched or downloaded, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, url: &str) {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }

    fn lookup(&self, url: &str) -> Result<&(Vec<u8>, String), FetchError> {
        self.resources.get(url).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[async_trait]
impl MediaFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, FetchError> {
        self.record(url);
        let (bytes, content_type) = self.lookup(url)?;
        Ok(FetchedMedia {
            bytes: bytes.clone(),
            content_type: content_type.clone(),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<Download, FetchError> {
        self.record(url);
        if self.broken.contains(url) {
            tokio::fs::write(dest, b"partial").await?;
            return Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset mid-download",
            )));
        }
        let (bytes, content_type) = self.lookup(url)?;
        tokio::fs::write(dest, bytes).await?;
        Ok(Download {
            bytes_written: bytes.len() as u64,
            content_type: Some(content_type.clone()),
        })
    }
}
