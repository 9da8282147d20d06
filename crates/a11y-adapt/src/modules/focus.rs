//! Base correction: drop stylesheets that hide keyboard focus outlines.
//!
//! Runs before every profile. A matching `<style>` block is removed whole,
//! so running the correction twice leaves the document as running it once.

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::Document;

fn outline_suppression() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?im)outline(?:-style|-width)?\s*:\s*(?:none|0(?:px)?)\s*(?:!important\s*)?(?:;|\}|$)",
        )
        .expect("outline pattern is valid")
    })
}

/// Whether `css` contains a declaration that removes focus outlines.
pub fn disables_focus_outline(css: &str) -> bool {
    outline_suppression().is_match(css)
}

/// Remove every `<style>` block that disables focus outlines. Returns how many.
pub fn restore_focus_outlines(doc: &mut Document) -> usize {
    let offending: Vec<_> = doc
        .find_all("style")
        .into_iter()
        .filter(|style| disables_focus_outline(&style.text()))
        .collect();
    for style in &offending {
        doc.detach(style);
    }
    if offending.is_empty() {
        tracing::debug!("No focus-hiding stylesheets found");
    } else {
        tracing::info!(
            "Removed {} stylesheet(s) that hide focus outlines",
            offending.len()
        );
    }
    offending.len()
}
