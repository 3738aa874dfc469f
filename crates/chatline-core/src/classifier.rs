//! Keyword classifier for image intent.

/// Substrings whose presence marks a message as an image request.
pub const IMAGE_TRIGGER_PHRASES: &[&str] = &[
    "generate an image",
    "show me a picture",
    "draw",
    "illustrate",
    "image of",
];

/// Returns `true` when the lower-cased message contains any trigger phrase.
///
/// Plain substring matching: "don't draw" and "withdraw" both trigger.
pub fn is_image_request(message: &str) -> bool {
    let lowered = message.to_lowercase();
    IMAGE_TRIGGER_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
