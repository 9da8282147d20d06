//! Plain-language rewrite of the page's lead paragraph.

use super::RunContext;
use crate::dom::Document;

/// Replace the text of the first `p.lead` with a simplified version.
///
/// Only a paragraph holding a single text node is rewritten, so inline markup
/// is never flattened.
pub async fn simplify_lead(doc: &mut Document, ctx: &mut RunContext<'_>) -> bool {
    let Some(lead) = doc.find_first("p", Some("lead")) else {
        tracing::debug!("No lead paragraph to simplify");
        return false;
    };
    let Some(original) = lead.sole_text() else {
        tracing::debug!("Lead paragraph holds markup; leaving it alone");
        return false;
    };
    let original = original.trim();
    if original.is_empty() {
        return false;
    }

    let simplified = ctx.simplify(original).await;
    if simplified == original {
        return false;
    }
    doc.set_text(&lead, &simplified);
    tracing::info!("Simplified lead paragraph");
    true
}
