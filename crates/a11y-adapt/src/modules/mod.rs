//! Document mutation modules.
//!
//! Style modules inject one stylesheet each; content modules edit attributes
//! or insert nodes. Modules that need generated text draw it through a
//! [`RunContext`], which holds the rate-limit gate for the whole run.

pub mod alt_text;
pub mod aria;
pub mod focus;
pub mod media;
pub mod progress;
pub mod registry;
pub mod simplify;
pub mod style;

pub use registry::Module;

use crate::generative::GenerativeTasks;
use crate::timing::Cooldown;
use crate::types::VideoTask;

/// Per-run access to the generative tasks.
///
/// Every call after the first waits out the cooldown, whichever module makes
/// it: image, text and video calls share one provider quota.
pub struct RunContext<'a> {
    tasks: &'a GenerativeTasks,
    cooldown: Cooldown,
}

impl<'a> RunContext<'a> {
    pub fn new(tasks: &'a GenerativeTasks) -> Self {
        Self {
            tasks,
            cooldown: Cooldown::new(tasks.config().cooldown),
        }
    }

    pub async fn describe_image(&mut self, url: &str) -> String {
        self.cooldown.ready().await;
        self.tasks.describe_image(url).await
    }

    pub async fn simplify(&mut self, text: &str) -> String {
        self.cooldown.ready().await;
        self.tasks.simplify(text).await
    }

    pub async fn video_text(&mut self, url: &str, task: VideoTask) -> String {
        self.cooldown.ready().await;
        match task {
            VideoTask::Transcription => self.tasks.transcribe_video(url).await,
            VideoTask::AudioDescription => self.tasks.describe_video(url).await,
        }
    }

    /// Generative calls made so far in this run.
    pub fn calls(&self) -> u32 {
        self.cooldown.calls()
    }
}
