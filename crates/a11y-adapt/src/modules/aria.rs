//! ARIA backfills: button roles on clickable containers, labels on form fields.

use crate::dom::Document;

const BUTTON_CLASSES: &[&str] = &["btn-primary", "btn"];

/// `div`/`span` elements styled as buttons become keyboard-reachable buttons.
pub fn backfill_roles(doc: &Document) -> bool {
    let mut fixed = 0usize;
    for node in doc.find_all_of(&["div", "span"]) {
        if node.has_attr("role") || !BUTTON_CLASSES.iter().any(|c| node.has_class(c)) {
            continue;
        }
        node.set_attr("role", "button");
        if !node.has_attr("tabindex") {
            node.set_attr("tabindex", "0");
        }
        fixed += 1;
    }
    if fixed > 0 {
        tracing::info!("Added role=button to {fixed} clickable element(s)");
    }
    fixed > 0
}

/// Inputs and textareas without an accessible name borrow their placeholder.
pub fn backfill_labels(doc: &Document) -> bool {
    let mut labelled = 0usize;
    for field in doc.find_all_of(&["input", "textarea"]) {
        if field.has_attr("aria-label") {
            continue;
        }
        let Some(placeholder) = field.attr("placeholder") else {
            continue;
        };
        let placeholder = placeholder.trim();
        if placeholder.is_empty() {
            continue;
        }
        field.set_attr("aria-label", placeholder);
        tracing::info!("Labelled form field with aria-label={placeholder:?}");
        labelled += 1;
    }
    labelled > 0
}
