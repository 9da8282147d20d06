//! Alt-text backfill for images that have none.

use super::RunContext;
use crate::dom::Document;

/// Give every `<img>` lacking an `alt` attribute a generated description.
///
/// An explicit `alt=""` marks a decorative image and is kept. Images without
/// a `src` have nothing to describe and are skipped.
pub async fn backfill(doc: &Document, ctx: &mut RunContext<'_>) -> bool {
    let mut filled = 0usize;
    for img in doc.find_all("img") {
        if img.has_attr("alt") {
            continue;
        }
        let Some(src) = img.attr("src").filter(|s| !s.trim().is_empty()) else {
            tracing::debug!("Skipping <img> without src");
            continue;
        };
        let alt = ctx.describe_image(src.trim()).await;
        tracing::info!("Backfilled alt text for {src}: {alt:?}");
        img.set_attr("alt", &alt);
        filled += 1;
    }
    filled > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generative::prompts::IMAGE_FALLBACK;
    use crate::testing::{offline_tasks, ScriptedModel, StaticFetcher};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_backfills_only_missing_alt() {
        let doc = Document::parse(
            r#"<body><img src="a.png"><img src="b.png" alt="Logo"><img src="c.png" alt=""><img></body>"#,
        );
        let model = Arc::new(ScriptedModel::replying("a red circle"));
        let fetcher = StaticFetcher::new().with("a.png", b"png".to_vec(), "image/png");
        let tasks = offline_tasks(model.clone(), fetcher);
        let mut ctx = RunContext::new(&tasks);

        assert!(backfill(&doc, &mut ctx).await);

        let imgs = doc.find_all("img");
        assert_eq!(imgs[0].attr("alt").as_deref(), Some("a red circle"));
        assert_eq!(imgs[1].attr("alt").as_deref(), Some("Logo"));
        assert_eq!(imgs[2].attr("alt").as_deref(), Some(""));
        assert!(!imgs[3].has_attr("alt"));
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_image_gets_fallback() {
        let doc = Document::parse(r#"<img src="https://gone.test/x.jpg">"#);
        let model = Arc::new(ScriptedModel::replying("unused"));
        let tasks = offline_tasks(model, StaticFetcher::new());
        let mut ctx = RunContext::new(&tasks);

        assert!(backfill(&doc, &mut ctx).await);
        let img = doc.find_first("img", None).unwrap();
        assert_eq!(img.attr("alt").as_deref(), Some(IMAGE_FALLBACK));
    }

    #[tokio::test]
    async fn test_no_images_is_noop() {
        let doc = Document::parse("<p>text only</p>");
        let tasks = offline_tasks(Arc::new(ScriptedModel::replying("x")), StaticFetcher::new());
        let mut ctx = RunContext::new(&tasks);
        assert!(!backfill(&doc, &mut ctx).await);
        assert_eq!(ctx.calls(), 0);
    }
}
