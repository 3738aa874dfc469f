//! Denylist content moderation.

/// Substrings that block a message before any provider is contacted.
pub const DENYLIST_TERMS: &[&str] = &["violence", "weapon", "kill", "bomb", "terror"];

/// Fixed reply returned for a rejected message.
pub const REFUSAL_REPLY: &str =
    "⚠️ Sorry, I can't help with that request because it contains restricted content.";

/// Returns `false` when the lower-cased message contains a denylisted term.
pub fn is_safe(message: &str) -> bool {
    let lowered = message.to_lowercase();
    !DENYLIST_TERMS.iter().any(|term| lowered.contains(term))
}
