//! The closed set of mutation modules and their dispatch.

use super::{alt_text, aria, media, progress, simplify, style, RunContext};
use crate::dom::Document;
use crate::profile::{Colorblindness, ScaleLevel};
use crate::types::VideoTask;

/// One mutation, carrying whatever parameters it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    TextScale(ScaleLevel),
    VisualHypersensitivity,
    ColorblindFilter(Colorblindness),
    LightSensitivity,
    HighContrast,
    AltText,
    AriaRoles,
    FormLabels,
    AudioDescription,
    AutoplaySuppression,
    Transcription,
    ReadableFont,
    ButtonHighlight,
    CompactSpacing,
    TextSimplification,
    /// Fill percentage, 0-100.
    ProgressIndicator(u8),
}

impl Module {
    pub fn name(&self) -> &'static str {
        match self {
            Module::TextScale(_) => "text-scale",
            Module::VisualHypersensitivity => "visual-hypersensitivity",
            Module::ColorblindFilter(_) => "colorblind-filter",
            Module::LightSensitivity => "light-sensitivity",
            Module::HighContrast => "high-contrast",
            Module::AltText => "alt-text",
            Module::AriaRoles => "aria-roles",
            Module::FormLabels => "form-labels",
            Module::AudioDescription => "audio-description",
            Module::AutoplaySuppression => "autoplay-suppression",
            Module::Transcription => "transcription",
            Module::ReadableFont => "readable-font",
            Module::ButtonHighlight => "button-highlight",
            Module::CompactSpacing => "compact-spacing",
            Module::TextSimplification => "text-simplification",
            Module::ProgressIndicator(_) => "progress-indicator",
        }
    }

    /// Whether the module calls the generative provider.
    pub fn is_generative(&self) -> bool {
        matches!(
            self,
            Module::AltText
                | Module::AudioDescription
                | Module::Transcription
                | Module::TextSimplification
        )
    }

    /// Apply to `doc`. Returns whether anything changed.
    pub async fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>) -> bool {
        let name = self.name();
        match *self {
            Module::TextScale(level) => match style::text_scale(level) {
                Some(css) => style::inject(doc, name, &css),
                None => false,
            },
            Module::VisualHypersensitivity => {
                style::inject(doc, name, style::VISUAL_HYPERSENSITIVITY)
            }
            Module::ColorblindFilter(kind) => match style::colorblind(kind) {
                Some(css) => style::inject(doc, name, css),
                None => false,
            },
            Module::LightSensitivity => style::inject(doc, name, style::LIGHT_SENSITIVITY),
            Module::HighContrast => style::inject(doc, name, style::HIGH_CONTRAST),
            Module::AltText => alt_text::backfill(doc, ctx).await,
            Module::AriaRoles => aria::backfill_roles(doc),
            Module::FormLabels => aria::backfill_labels(doc),
            Module::AudioDescription => {
                media::append_video_text(doc, ctx, VideoTask::AudioDescription).await
            }
            Module::AutoplaySuppression => media::suppress_autoplay(doc),
            Module::Transcription => {
                media::append_video_text(doc, ctx, VideoTask::Transcription).await
            }
            Module::ReadableFont => style::inject(doc, name, style::READABLE_FONT),
            Module::ButtonHighlight => style::inject(doc, name, style::BUTTON_HIGHLIGHT),
            Module::CompactSpacing => style::inject(doc, name, style::COMPACT_SPACING),
            Module::TextSimplification => simplify::simplify_lead(doc, ctx).await,
            Module::ProgressIndicator(percent) => progress::insert(doc, percent),
        }
    }
}
