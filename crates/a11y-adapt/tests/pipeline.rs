//! End-to-end tests of the adaptation pipeline against in-process fakes.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::time::Instant;

use a11y_adapt::modules::focus::restore_focus_outlines;
use a11y_adapt::testing::{ScriptedModel, StaticFetcher};
use a11y_adapt::{AdaptError, Adapter, Document, EngineConfig, GenerativeTasks};

// ─────────────────────── helpers ───────────────────────

const STORE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Store</title>
  <style>a:focus, button:focus { outline: none; }</style>
  <style>body { font-family: serif; }</style>
</head>
<body>
  <nav class="navbar"><a href="/">Home</a></nav>
  <p class="lead">Our extraordinarily comprehensive catalogue encompasses innumerable products.</p>
  <img src="https://cdn.test/a.png">
  <img src="https://cdn.test/logo.png" alt="Store logo">
  <div class="btn btn-primary">Buy now</div>
  <input type="email" placeholder="Email address">
  <div class="player"><video autoplay><source src="https://cdn.test/v.mp4"></video></div>
</body>
</html>"#;

fn config(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with("https://cdn.test/a.png", b"png".to_vec(), "image/png")
        .with("https://cdn.test/b.png", b"png".to_vec(), "image/png")
        .with("https://cdn.test/c.png", b"png".to_vec(), "image/png")
        .with("https://cdn.test/v.mp4", b"mp4".to_vec(), "video/mp4")
}

/// Adapter over fakes, with its scratch dir and model for inspection.
fn adapter_with(
    model: ScriptedModel,
    cooldown: Duration,
) -> (Adapter, Arc<ScriptedModel>, tempfile::TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let engine = EngineConfig {
        scratch_dir: scratch.path().to_path_buf(),
        cooldown,
        ..EngineConfig::default().without_delays()
    };
    let model = Arc::new(model);
    let tasks = GenerativeTasks::new(model.clone(), Arc::new(fetcher()), engine);
    (Adapter::new(Arc::new(tasks)), model, scratch)
}

fn adapter(reply: &str) -> (Adapter, Arc<ScriptedModel>, tempfile::TempDir) {
    adapter_with(ScriptedModel::replying(reply), Duration::ZERO)
}

// ─────────────────────── base correction ───────────────────────

#[tokio::test]
async fn base_correction_runs_for_every_profile() {
    let (adapter, _, _dir) = adapter("x");
    for profile in ["visual", "auditory", "cognitive"] {
        let html = adapter
            .adapt_html(STORE_PAGE, profile, &Map::new())
            .await
            .unwrap();
        assert!(!html.contains("outline: none"), "{profile} kept focus-hiding CSS");
        assert!(html.contains("font-family: serif"));
    }
}

#[tokio::test]
async fn base_correction_is_idempotent() {
    let (adapter, _, _dir) = adapter("x");
    let once = adapter
        .adapt_html(STORE_PAGE, "visual", &Map::new())
        .await
        .unwrap();
    let twice = adapter.adapt_html(&once, "visual", &Map::new()).await.unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn empty_config_applies_only_base_correction() {
    let (adapter, model, _dir) = adapter("x");

    let mut expected = Document::parse(STORE_PAGE);
    restore_focus_outlines(&mut expected);
    let expected = expected.serialize().unwrap();

    for profile in ["visual", "auditory", "cognitive"] {
        let html = adapter
            .adapt_html(STORE_PAGE, profile, &Map::new())
            .await
            .unwrap();
        assert_eq!(html, expected, "{profile} did more than the base correction");
    }
    assert!(model.requests().is_empty());
}

// ─────────────────────── visual ───────────────────────

#[tokio::test]
async fn blind_backfills_alt_without_overwriting() {
    let (adapter, _, _dir) = adapter("a red circle");
    let html = adapter
        .adapt_html(STORE_PAGE, "visual", &config(json!({ "total_blindness": true })))
        .await
        .unwrap();

    let doc = Document::parse(&html);
    let imgs = doc.find_all("img");
    assert_eq!(imgs[0].attr("alt").as_deref(), Some("a red circle"));
    assert_eq!(imgs[1].attr("alt").as_deref(), Some("Store logo"));

    let button = doc.find_first("div", Some("btn-primary")).unwrap();
    assert_eq!(button.attr("role").as_deref(), Some("button"));
    let email = doc.find_first("input", None).unwrap();
    assert_eq!(email.attr("aria-label").as_deref(), Some("Email address"));
}

#[tokio::test]
async fn minimal_image_gets_generated_alt() {
    let (adapter, _, _dir) = adapter("a red circle");
    let html = adapter
        .adapt_html(
            r#"<html><head></head><body><img src="https://cdn.test/a.png"></body></html>"#,
            "visual",
            &config(json!({ "total_blindness": true })),
        )
        .await
        .unwrap();
    assert!(html.contains(r#"<img src="https://cdn.test/a.png" alt="a red circle">"#));
}

#[tokio::test]
async fn hypersensitivity_wins_over_colorblind_filter() {
    let (adapter, _, _dir) = adapter("x");
    let html = adapter
        .adapt_html(
            STORE_PAGE,
            "visual",
            &config(json!({ "visual_hypersensitivity": true, "colorblindness_type": "deuteranopia" })),
        )
        .await
        .unwrap();
    assert!(html.contains(r#"data-a11y-module="visual-hypersensitivity""#));
    assert!(!html.contains("colorblind-filter"));
    assert!(!html.contains("#FFFF00"));
}

#[tokio::test]
async fn legacy_low_vision_protanopia() {
    let (adapter, _, _dir) = adapter("x");
    let html = adapter
        .adapt_html(STORE_PAGE, "visao_limitada", &config(json!({ "necessidade": "protanopia" })))
        .await
        .unwrap();
    assert!(html.contains("#FFA500"));
}

#[tokio::test(start_paused = true)]
async fn image_calls_are_spaced_by_the_cooldown() {
    let (adapter, model, _dir) = adapter_with(ScriptedModel::replying("pic"), Duration::from_secs(31));
    let page = r#"<html><head></head><body>
        <img src="https://cdn.test/a.png"><img src="https://cdn.test/b.png"><img src="https://cdn.test/c.png">
        </body></html>"#;

    let start = Instant::now();
    let html = adapter
        .adapt_html(page, "blind", &Map::new())
        .await
        .unwrap();

    assert_eq!(model.requests().len(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(62));
    assert_eq!(html.matches(r#"alt="pic""#).count(), 3);
}

// ─────────────────────── auditory ───────────────────────

#[tokio::test]
async fn deaf_gets_transcript_after_video_parent() {
    let (adapter, model, dir) = adapter("Hello world");
    let html = adapter
        .adapt_html(
            r#"<html><head></head><body><div><video><source src="https://cdn.test/v.mp4"></video></div></body></html>"#,
            "auditory",
            &config(json!({ "deafness_transcription": true })),
        )
        .await
        .unwrap();

    let doc = Document::parse(&html);
    let container = doc.find_first("video", None).unwrap().parent().unwrap();
    let block = container.next_element_sibling().unwrap();
    assert!(block.text().contains("Hello world"));
    assert_eq!(block.attr("role").as_deref(), Some("status"));

    assert!(model.live_files().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn transcript_for_body_level_video_survives_rerun() {
    let (adapter, model, _dir) = adapter("Hello world");
    let options = config(json!({ "deafness_transcription": true }));
    let page = r#"<html><head></head><body><video><source src="https://cdn.test/v.mp4"></video></body></html>"#;

    let first = adapter.adapt_html(page, "auditory", &options).await.unwrap();
    assert!(!first.contains("</body><div"));
    assert_eq!(Document::parse(&first).serialize().unwrap(), first);

    let second = adapter.adapt_html(&first, "auditory", &options).await.unwrap();
    assert_eq!(second, first);
    let doc = Document::parse(&second);
    let blocks = doc
        .find_all("div")
        .iter()
        .filter(|d| d.has_class("a11y-transcript"))
        .count();
    assert_eq!(blocks, 1);
    assert_eq!(model.uploads(), 1);
}

#[tokio::test]
async fn autoplay_then_transcript() {
    let (adapter, _, _dir) = adapter("Hello world");
    let html = adapter
        .adapt_html(
            STORE_PAGE,
            "surdo",
            &config(json!({ "desativar_autoplay": true })),
        )
        .await
        .unwrap();
    let doc = Document::parse(&html);
    let video = doc.find_first("video", None).unwrap();
    assert!(!video.has_attr("autoplay"));
    assert!(video.has_attr("controls"));
    assert!(doc.find_first("div", Some("a11y-transcript")).is_some());
}

// ─────────────────────── cognitive ───────────────────────

#[tokio::test]
async fn dyslexia_font_and_simplified_lead() {
    let (adapter, _, _dir) = adapter("We sell many things.");
    let html = adapter
        .adapt_html(STORE_PAGE, "dislexia", &Map::new())
        .await
        .unwrap();
    assert!(html.contains("Verdana"));
    let doc = Document::parse(&html);
    assert_eq!(
        doc.find_first("p", Some("lead")).unwrap().text(),
        "We sell many things."
    );
}

#[tokio::test]
async fn generative_failures_degrade_without_error() {
    let (adapter, _, _dir) = adapter_with(ScriptedModel::failing(), Duration::ZERO);
    let html = adapter
        .adapt_html(
            STORE_PAGE,
            "cognitive",
            &config(json!({ "simplify_text": true, "progress_bar": true, "progress_percent": 60 })),
        )
        .await
        .unwrap();
    let doc = Document::parse(&html);
    assert!(doc
        .find_first("p", Some("lead"))
        .unwrap()
        .text()
        .starts_with("Our extraordinarily"));
    let bar = doc.find_first("div", Some("a11y-progress")).unwrap();
    assert_eq!(bar.attr("aria-valuenow").as_deref(), Some("60"));
}

// ─────────────────────── errors ───────────────────────

#[tokio::test]
async fn unknown_profile_is_reported() {
    let (adapter, _, _dir) = adapter("x");
    let err = adapter
        .adapt_html(STORE_PAGE, "olfactory", &Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AdaptError::UnknownProfile(ref p) if p == "olfactory"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn malformed_option_is_reported() {
    let (adapter, _, _dir) = adapter("x");
    let err = adapter
        .adapt_html(STORE_PAGE, "visual", &config(json!({ "total_blindness": "sure" })))
        .await
        .unwrap_err();
    assert!(matches!(err, AdaptError::InvalidConfig { .. }));
}
