//! Video and audio modules: generated text blocks and autoplay suppression.

use super::RunContext;
use crate::dom::{Document, NodeRef};
use crate::types::VideoTask;

pub const TRANSCRIPT_CLASS: &str = "a11y-transcript";
pub const AUDIO_DESCRIPTION_CLASS: &str = "a11y-audio-description";

struct BlockStyle {
    marker: &'static str,
    alert: &'static str,
    title: &'static str,
}

fn block_style(task: VideoTask) -> BlockStyle {
    match task {
        VideoTask::Transcription => BlockStyle {
            marker: TRANSCRIPT_CLASS,
            alert: "alert-info",
            title: "Video transcript (AI-generated):",
        },
        VideoTask::AudioDescription => BlockStyle {
            marker: AUDIO_DESCRIPTION_CLASS,
            alert: "alert-warning",
            title: "Audio description for blind users (AI-generated):",
        },
    }
}

/// Where the first `<video>` loads from: its first `<source src>`, else its own `src`.
pub fn video_source(video: &NodeRef) -> Option<String> {
    video
        .find_first("source", None)
        .and_then(|source| source.attr("src"))
        .or_else(|| video.attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
}

// Elements whose content model is phrasing only; a `<div>` placed inside one
// is moved elsewhere when the markup is parsed again.
const PHRASING_ONLY: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "button", "cite", "code", "dfn", "em", "h1", "h2", "h3",
    "h4", "h5", "h6", "i", "kbd", "label", "mark", "p", "picture", "pre", "q", "s", "samp",
    "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// The node the status block goes after: the video's parent, or the video
/// itself when the parent is a document-level node. Climbs past phrasing-only
/// containers so the block always lands where a `<div>` may live.
fn block_anchor(video: &NodeRef) -> Option<NodeRef> {
    let parent = video.parent()?;
    let document_level = match parent.tag_name() {
        Some(tag) => matches!(tag.as_str(), "body" | "html" | "head"),
        None => true,
    };
    let mut anchor = if document_level { video.clone() } else { parent };

    loop {
        let container = anchor.parent()?;
        let phrasing = container
            .tag_name()
            .is_some_and(|tag| PHRASING_ONLY.contains(&tag.as_str()));
        if !phrasing {
            return Some(anchor);
        }
        anchor = container;
    }
}

/// Insert a status block with generated text right after the first video's container.
pub async fn append_video_text(
    doc: &mut Document,
    ctx: &mut RunContext<'_>,
    task: VideoTask,
) -> bool {
    let Some(video) = doc.find_first("video", None) else {
        tracing::debug!("No <video> in document; skipping {}", task.label());
        return false;
    };
    let Some(url) = video_source(&video) else {
        tracing::debug!("<video> has no source; skipping {}", task.label());
        return false;
    };
    let Some(anchor) = block_anchor(&video) else {
        tracing::debug!("<video> has no container to anchor the {} to", task.label());
        return false;
    };

    let style = block_style(task);
    if anchor
        .next_element_sibling()
        .is_some_and(|next| next.has_class(style.marker))
    {
        tracing::debug!("Video {} already present", task.label());
        return false;
    }

    let text = ctx.video_text(&url, task).await;

    let block = doc.create_element("div");
    block.set_attr("class", &format!("alert {} mt-2 {}", style.alert, style.marker));
    block.set_attr("role", "status");
    let title = doc.create_element("p");
    title.set_attr("class", "fw-bold");
    doc.set_text(&title, style.title);
    let body = doc.create_element("p");
    doc.set_text(&body, &text);
    doc.append_child(&block, &title);
    doc.append_child(&block, &body);

    let inserted = doc.insert_after(&anchor, &block);
    if inserted {
        tracing::info!("Added video {} for {url}", task.label());
    }
    inserted
}

/// Stop media from starting on its own and keep the player controls reachable.
pub fn suppress_autoplay(doc: &Document) -> bool {
    let mut changed = 0usize;
    for media in doc.find_all_of(&["video", "audio"]) {
        let mut touched = media.remove_attr("autoplay");
        if media.attr("preload").as_deref() != Some("metadata") {
            media.set_attr("preload", "metadata");
            touched = true;
        }
        if !media.has_attr("controls") {
            media.set_attr("controls", "");
            touched = true;
        }
        if touched {
            changed += 1;
        }
    }
    if changed > 0 {
        tracing::info!("Suppressed autoplay on {changed} media element(s)");
    }
    changed > 0
}
