//! Generative provider boundary and the fallback-only task client built on it.

pub mod gemini;
pub mod model;
pub mod prompts;
pub mod tasks;

pub use gemini::GeminiClient;
pub use model::{GenerativeModel, Part};
pub use tasks::GenerativeTasks;
