//! Fixed instruction prompts and fallback texts.
//!
//! Every prompt pins the response language and forbids preambles, so the
//! reply can be inserted into the page verbatim.

/// Substituted for a missing image description.
pub const IMAGE_FALLBACK: &str = "Image description unavailable";

/// Substituted for a missing video transcript or audio description.
pub const VIDEO_FALLBACK: &str = "The video could not be processed.";

pub fn image_description(language: &str) -> String {
    format!(
        "Describe this image for a blind screen reader user. \
         Be concise, at most 10 words. Respond in {language}. \
         Do NOT include any confirmation or introductory sentence. \
         Provide ONLY the description."
    )
}

pub fn simplification(language: &str, text: &str) -> String {
    format!(
        "Simplify the following text for a person with dyslexia or a cognitive \
         disability. Use short, direct sentences. Respond in {language}. \
         Do NOT include any confirmation or introductory sentence. \
         Provide ONLY the simplified text.\n\nText:\n{text}"
    )
}

pub fn transcription(language: &str) -> String {
    format!(
        "Listen to the audio of this video and transcribe exactly what is said. \
         If there is no speech, describe the sounds (e.g. '[instrumental music]'). \
         Respond in {language}. \
         Do NOT include any confirmation or introductory sentence. \
         Provide ONLY the transcript."
    )
}

pub fn audio_description(language: &str) -> String {
    format!(
        "You are an audio description narrator for a blind person. \
         Watch this video and describe only the visual information that is not \
         obvious from the sound. What is happening visually? Respond in {language}. \
         Do NOT include any confirmation or introductory sentence. \
         Provide ONLY the description."
    )
}
