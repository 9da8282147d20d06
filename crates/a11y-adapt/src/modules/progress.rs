//! Static reading-progress indicator at the top of the page.

use crate::dom::Document;

pub const PROGRESS_CLASS: &str = "a11y-progress";

/// Prepend a non-animated progress bar to `<body>`, once.
pub fn insert(doc: &mut Document, percent: u8) -> bool {
    let Some(body) = doc.body() else {
        tracing::debug!("No <body> in document; skipping progress indicator");
        return false;
    };
    if doc.find_first("div", Some(PROGRESS_CLASS)).is_some() {
        tracing::debug!("Progress indicator already present");
        return false;
    }
    let percent = percent.min(100);

    let bar = doc.create_element("div");
    bar.set_attr("class", PROGRESS_CLASS);
    bar.set_attr("role", "progressbar");
    bar.set_attr("aria-label", "Reading progress");
    bar.set_attr("aria-valuemin", "0");
    bar.set_attr("aria-valuemax", "100");
    bar.set_attr("aria-valuenow", &percent.to_string());
    bar.set_attr(
        "style",
        "width: 100%; height: 8px; background-color: #E0E0E0;",
    );

    let fill = doc.create_element("div");
    fill.set_attr("class", "a11y-progress-fill");
    fill.set_attr(
        "style",
        &format!("width: {percent}%; height: 100%; background-color: #1565C0;"),
    );
    doc.append_child(&bar, &fill);
    doc.prepend_child(&body, &bar);

    tracing::info!("Inserted progress indicator at {percent}%");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepends_once() {
        let mut doc = Document::parse("<body><h1>Title</h1></body>");
        assert!(insert(&mut doc, 40));
        assert!(!insert(&mut doc, 40));

        let body = doc.body().unwrap();
        let first = &body.element_children()[0];
        assert!(first.has_class(PROGRESS_CLASS));
        assert_eq!(first.attr("role").as_deref(), Some("progressbar"));
        assert_eq!(first.attr("aria-valuenow").as_deref(), Some("40"));
        let fill = &first.element_children()[0];
        assert!(fill.attr("style").unwrap().starts_with("width: 40%"));
        assert_eq!(doc.find_all("div").len(), 2);
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut doc = Document::parse("<p>x</p>");
        assert!(insert(&mut doc, 200));
        let bar = doc.find_first("div", Some(PROGRESS_CLASS)).unwrap();
        assert_eq!(bar.attr("aria-valuenow").as_deref(), Some("100"));
    }
}
