//! Stylesheet injection and the stylesheets themselves.
//!
//! No stylesheet here may suppress focus outlines; the base correction would
//! treat such a block as defective on the next run.

use crate::dom::Document;
use crate::profile::{Colorblindness, ScaleLevel};

/// Marks each injected `<style>` with the module that produced it.
pub const MODULE_ATTR: &str = "data-a11y-module";

/// Append a `<style>` block to `<head>`. Returns `false` when there is no head.
pub fn inject(doc: &mut Document, module: &str, css: &str) -> bool {
    let css = css.trim();
    if css.is_empty() {
        return false;
    }
    let Some(head) = doc.head() else {
        tracing::debug!("No <head> in document; skipping {module} stylesheet");
        return false;
    };
    let style = doc.create_element("style");
    style.set_attr(MODULE_ATTR, module);
    doc.set_text(&style, &format!("\n{css}\n"));
    doc.append_child(&head, &style);
    tracing::info!("Injected {module} stylesheet");
    true
}

pub fn text_scale(level: ScaleLevel) -> Option<String> {
    let percent = match level {
        ScaleLevel::None => return None,
        ScaleLevel::Mild => 115,
        ScaleLevel::Moderate => 140,
        ScaleLevel::Severe => 175,
    };
    Some(format!("html {{ font-size: {percent}% !important; }}"))
}

pub fn colorblind(kind: Colorblindness) -> Option<&'static str> {
    match kind {
        Colorblindness::None => None,
        // Green success buttons read as brown to protanopes; shift them to orange.
        Colorblindness::Protanopia => Some(
            r#"
.btn-success {
    background-color: #FFA500 !important;
    border-color: #FFA500 !important;
}
img, video { filter: hue-rotate(-20deg) saturate(1.3); }"#,
        ),
        Colorblindness::Deuteranopia => Some(
            r#"
.btn-success {
    background-color: #FFFF00 !important;
    border-color: #FFFF00 !important;
    color: #000 !important;
}
img, video { filter: hue-rotate(20deg) saturate(1.3); }"#,
        ),
    }
}

pub const VISUAL_HYPERSENSITIVITY: &str = r#"
html { filter: grayscale(100%) brightness(0.8) !important; }
*, *::before, *::after {
    animation: none !important;
    transition: none !important;
}"#;

pub const LIGHT_SENSITIVITY: &str = r#"
html, body {
    background-color: #1e1e1e !important;
    color: #d8d8d8 !important;
}
img, video { opacity: 0.85; }"#;

pub const HIGH_CONTRAST: &str = r#"
body, .container, .card, .modal-content, .modal-body {
    background-color: #000 !important;
    color: #FFF !important;
}
.navbar, footer, .modal-header, .modal-footer {
    background-color: #111 !important;
}
h1, h2, h5, .modal-title {
    color: #FFF !important;
}
a, .nav-link {
    color: #FFFF00 !important;
    text-decoration: underline !important;
}
.btn-primary, .btn-success, .btn {
    background-color: #FFF !important;
    color: #000 !important;
    border: 2px solid #FFF !important;
}
input, textarea {
    background-color: #222 !important;
    color: #FFF !important;
    border-color: #FFF !important;
}
input::placeholder, textarea::placeholder {
    color: #BBB !important;
    opacity: 1 !important;
}
.border-bottom, .border-top {
    border-color: #444 !important;
}"#;

pub const READABLE_FONT: &str = r#"
html { font-size: 140% !important; }
body {
    font-family: 'Verdana', sans-serif !important;
    line-height: 1.6 !important;
}"#;

pub const BUTTON_HIGHLIGHT: &str = r#"
button, .btn, [role="button"], input[type="submit"] {
    outline: 3px solid #FF8C00 !important;
    outline-offset: 2px;
    font-weight: bold !important;
}
button:focus, .btn:focus, [role="button"]:focus {
    outline: 3px solid #005FCC !important;
}"#;

pub const COMPACT_SPACING: &str = r#"
p, li, h1, h2, h3, h4, h5, h6 {
    margin-top: 0.25em !important;
    margin-bottom: 0.5em !important;
}
body { line-height: 1.4 !important; }
.container, section { padding-top: 0.5rem !important; padding-bottom: 0.5rem !important; }"#;
