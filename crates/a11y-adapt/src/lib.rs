//! a11y-adapt: accessibility remediation engine for already-rendered HTML.
//!
//! A [`Profile`] selects an ordered set of mutation [`Module`]s; the
//! [`Adapter`] runs the universal focus-outline correction, then each module
//! in turn against one [`Document`]. Modules that need generated content
//! (alt text, simplified text, video transcripts) go through
//! [`GenerativeTasks`], which never fails: provider errors degrade to fixed
//! fallback text.

pub mod adapter;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod generative;
pub mod modules;
pub mod profile;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timing;
pub mod types;
pub mod video;

pub use adapter::{AdaptReport, Adapter, ModuleOutcome};
pub use config::EngineConfig;
pub use dom::{Document, NodeRef};
pub use fetch::{HttpFetcher, MediaFetcher};
pub use generative::{GeminiClient, GenerativeModel, GenerativeTasks};
pub use modules::Module;
pub use profile::Profile;
pub use timing::{Cooldown, TimingPolicy};
pub use types::*;
pub use video::{IngestionOutcome, VideoIngestion, VideoState};
