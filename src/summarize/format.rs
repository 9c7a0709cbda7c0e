//! Deterministic post-processing of raw model output into a bounded bullet
//! summary.
//!
//! Generation backends are not trusted to follow the prompt: they may return
//! prose instead of a list, preface the summary with meta-commentary, or blow
//! past the requested length. This module enforces the structural guarantees
//! (1..=3 bullets, rendered text capped at 150 characters) no matter what the
//! model produced.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Maximum number of bullets in a summary.
pub const MAX_BULLETS: usize = 3;

/// Maximum rendered summary length in characters.
pub const MAX_RENDERED_CHARS: usize = 150;

/// Sentinel bullet used when no usable content survives filtering.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

/// Minimum character index at which a truncation cut may back up to a space.
/// Below this the truncated text would be mangled into nothing.
const MIN_SPACE_CUT_INDEX: usize = 10;

/// Narration filter: case-insensitive patterns for content-free
/// meta-commentary the model emits about the summary task itself ("Here is a
/// summary in three bullet points:"). Kept as policy data so individual
/// patterns can be tuned and tested independently.
const NARRATION_PATTERNS: [&str; 11] = [
    r"^here\s+is",
    r"^this\s+is",
    r"^the\s+following",
    r"summary\s+of",
    r"bullet\s+points?",
    r"three\s+bullet",
    r"^each\s+under",
    r"^in\s+(three|3)",
    r"^\d+\s+words?",
    r"^\d+\s+bullets?",
    r"under\s+\d+\s+words?",
];

static NARRATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NARRATION_PATTERNS
        .iter()
        .filter_map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .collect()
});

/// Leading bullet or numbering marker on a candidate line.
static BULLET_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+\.)\s*").ok());

/// A formatted, bounded bullet summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedSummary {
    /// Bullet contents without markers, in original order (1..=3 entries).
    pub bullets: Vec<String>,
    /// Newline-joined bullet lines, each prefixed with "• ", capped at
    /// [`MAX_RENDERED_CHARS`] characters with a trailing ellipsis when cut.
    pub rendered_text: String,
}

/// Reduce raw model output to a bounded bullet summary.
///
/// Never fails: when no usable content survives the narration filter the
/// result is the single sentinel bullet [`SUMMARY_UNAVAILABLE`].
#[must_use]
pub fn format_summary(raw: &str) -> FormattedSummary {
    let normalized = raw.replace('\r', "");
    let normalized = normalized.trim();

    // First pass: treat the output as a list, one candidate per line.
    let mut candidates: Vec<String> = normalized
        .lines()
        .map(strip_marker)
        .filter(|line| is_content(line))
        .collect();

    // Model returned prose instead of a list: split on sentence terminators.
    if candidates.len() <= 1 {
        candidates = normalized
            .split(['.', '!', '?'])
            .map(|sentence| sentence.trim().to_string())
            .filter(|sentence| is_content(sentence))
            .collect();
    }

    if candidates.is_empty() {
        return FormattedSummary {
            bullets: vec![SUMMARY_UNAVAILABLE.to_string()],
            rendered_text: format!("• {SUMMARY_UNAVAILABLE}"),
        };
    }

    candidates.truncate(MAX_BULLETS);

    let joined = candidates
        .iter()
        .map(|bullet| format!("• {bullet}"))
        .collect::<Vec<_>>()
        .join("\n");

    FormattedSummary {
        bullets: candidates,
        rendered_text: enforce_length(&joined),
    }
}

/// Strip a leading bullet/number marker from a line and trim it.
fn strip_marker(line: &str) -> String {
    let trimmed = line.trim();
    match BULLET_MARKER.as_ref() {
        Some(marker) => marker.replace(trimmed, "").trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Whether a candidate line carries actual content (non-empty and not
/// narration).
fn is_content(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    !NARRATION.iter().any(|pattern| pattern.is_match(line))
}

/// Hard post-hoc cap on the rendered text, applied after bullet composition.
///
/// The cut respects line content where it can: after truncating, the text
/// backs up to the nearest preceding space (only when that space sits past
/// index [`MIN_SPACE_CUT_INDEX`]) before the ellipsis is appended. The result
/// never exceeds [`MAX_RENDERED_CHARS`] characters, ellipsis included.
fn enforce_length(rendered: &str) -> String {
    if rendered.chars().count() <= MAX_RENDERED_CHARS {
        return rendered.to_string();
    }

    let mut kept: Vec<char> = rendered.chars().take(MAX_RENDERED_CHARS - 3).collect();
    if let Some(space_index) = kept.iter().rposition(|c| *c == ' ') {
        if space_index > MIN_SPACE_CUT_INDEX {
            kept.truncate(space_index);
        }
    }

    let mut result: String = kept.into_iter().collect();
    result.truncate(result.trim_end().len());
    result.push_str("...");
    result
}
