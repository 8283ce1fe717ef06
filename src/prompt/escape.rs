//! Entity escaping for prompt interpolation.
//!
//! # Responsibilities
//! - Neutralize tag-boundary characters in user-supplied text
//! - Guarantee escaped text cannot close or open a prompt tag
//!
//! # Design Decisions
//! - Ampersand is replaced first so entities produced by the later
//!   substitutions are never double-escaped
//! - `]` is escaped to block CDATA-style `]]>` breakout sequences
//! - Everything else passes through unchanged

/// Escape user text before it is interpolated into the pseudo-XML
/// tags of the generation prompt.
///
/// Replaces `&`, `<`, `>`, and `]` with entities, in that order.
/// Text already free of those characters is returned unchanged.
pub fn escape_for_prompt(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(']', "&#93;")
}
