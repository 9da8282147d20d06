//! Profile dispatcher: base correction, then the profile's modules in order.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dom::Document;
use crate::generative::GenerativeTasks;
use crate::modules::{focus, RunContext};
use crate::profile::{Profile, ProfileEntry, CATALOG};
use crate::types::AdaptResult;

/// What one pipeline run did.
#[derive(Debug, Clone, Serialize)]
pub struct AdaptReport {
    pub profile: &'static str,
    /// `<style>` blocks removed by the base correction.
    pub focus_styles_removed: usize,
    pub modules: Vec<ModuleOutcome>,
    /// Generative calls made during the run.
    pub generative_calls: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutcome {
    pub module: &'static str,
    pub changed: bool,
}

/// Applies accessibility profiles to documents.
#[derive(Clone)]
pub struct Adapter {
    tasks: Arc<GenerativeTasks>,
}

impl Adapter {
    pub fn new(tasks: Arc<GenerativeTasks>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &GenerativeTasks {
        &self.tasks
    }

    /// Every accepted profile identifier with the options it reads.
    pub fn profiles() -> &'static [ProfileEntry] {
        CATALOG
    }

    /// Mutate `doc` in place for `profile`.
    pub async fn apply(&self, doc: &mut Document, profile: &Profile) -> AdaptReport {
        let focus_styles_removed = focus::restore_focus_outlines(doc);

        let plan = profile.plan();
        tracing::info!(
            "Applying {} profile with {} module(s)",
            profile.name(),
            plan.len()
        );

        let mut ctx = RunContext::new(&self.tasks);
        let mut modules = Vec::with_capacity(plan.len());
        for module in plan {
            let changed = module.apply(doc, &mut ctx).await;
            if !changed {
                tracing::debug!("Module {} made no changes", module.name());
            }
            modules.push(ModuleOutcome {
                module: module.name(),
                changed,
            });
        }

        AdaptReport {
            profile: profile.name(),
            focus_styles_removed,
            modules,
            generative_calls: ctx.calls(),
        }
    }

    /// Parse, adapt and serialize.
    pub async fn adapt(&self, html: &str, profile: &Profile) -> AdaptResult<(String, AdaptReport)> {
        let mut doc = Document::parse(html);
        let report = self.apply(&mut doc, profile).await;
        Ok((doc.serialize()?, report))
    }

    /// Resolve `profile_id` against `config`, then adapt `html`.
    pub async fn adapt_html(
        &self,
        html: &str,
        profile_id: &str,
        config: &Map<String, Value>,
    ) -> AdaptResult<String> {
        let profile = Profile::resolve(profile_id, config)?;
        let (html, _) = self.adapt(html, &profile).await?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{offline_tasks, ScriptedModel, StaticFetcher};
    use crate::types::AdaptError;
    use serde_json::json;

    fn adapter(model: ScriptedModel) -> Adapter {
        Adapter::new(Arc::new(offline_tasks(Arc::new(model), StaticFetcher::new())))
    }

    #[tokio::test]
    async fn test_report_lists_modules_in_order() {
        let adapter = adapter(ScriptedModel::replying("x"));
        let profile = Profile::resolve(
            "cognitive",
            json!({ "highlight_buttons": true, "progress_bar": true })
                .as_object()
                .unwrap(),
        )
        .unwrap();
        let mut doc = Document::parse(
            "<html><head><style>:focus{outline:none}</style></head><body></body></html>",
        );

        let report = adapter.apply(&mut doc, &profile).await;
        assert_eq!(report.profile, "cognitive");
        assert_eq!(report.focus_styles_removed, 1);
        let names: Vec<_> = report.modules.iter().map(|m| m.module).collect();
        assert_eq!(names, vec!["button-highlight", "progress-indicator"]);
        assert!(report.modules.iter().all(|m| m.changed));
        assert_eq!(report.generative_calls, 0);
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let adapter = adapter(ScriptedModel::replying("x"));
        let err = adapter
            .adapt_html("<p>x</p>", "sonar", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AdaptError::UnknownProfile(_)));
    }

    #[test]
    fn test_catalog_exposed() {
        assert!(Adapter::profiles().iter().any(|p| p.id == "visual"));
    }
}
