//! Section locator for deltas generated from an excerpt of a larger
//! document.
//!
//! Scans candidate line windows of the document and scores each against the
//! excerpt's stored leading/trailing contexts, plus positional evidence from
//! the lines surrounding the window. The weights and thresholds here are
//! part of the observed contract; changing them changes which section wins
//! on borderline documents.

use ahash::AHashSet;
use tracing::{trace, warn};

use crate::internal::meta::ApplicationType;

const PRECEDING_WEIGHT: f64 = 0.6;
const FOLLOWING_WEIGHT: f64 = 0.4;
const POSITIONAL_WEIGHT: f64 = 0.2;

/// Scanning stops as soon as a candidate scores above this.
const EARLY_EXIT_CONFIDENCE: f64 = 0.85;
/// Best candidates at or below this are rejected as "no section match".
const CONFIDENCE_FLOOR: f64 = 0.30;
/// Window height when the delta does not record its excerpt's line count.
pub(crate) const DEFAULT_WINDOW_LINES: usize = 3;
/// Lines inspected on each side of a window for positional evidence.
const POSITIONAL_SPAN: usize = 2;

/// A located line window, `start..end` over the document's lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SectionMatch {
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// Find the best-matching window of `lines` for an excerpt with the given
/// contexts, or `None` when nothing clears the confidence floor.
///
/// The winning window is extended forward across purely-blank trailing
/// lines so reconstruction preserves the document's original spacing.
pub(crate) fn locate_section(
    lines: &[&str],
    preceding: &str,
    following: Option<&str>,
    window_lines: usize,
) -> Option<SectionMatch> {
    if lines.is_empty() {
        return None;
    }
    let window_lines = window_lines.max(1);
    let preceding_trimmed = preceding.trim();
    let following_trimmed = following.unwrap_or("").trim();

    let mut best: Option<SectionMatch> = None;
    for start in 0..lines.len() {
        let end = (start + window_lines).min(lines.len());
        let window: String = lines[start..end].concat();

        let preceding_score = context_affinity(&window, preceding_trimmed, Edge::Leading);
        let following_score = if following_trimmed.is_empty() {
            0.0
        } else {
            context_affinity(&window, following_trimmed, Edge::Trailing)
        };
        let positional = positional_evidence(
            lines,
            start,
            end,
            preceding_trimmed,
            following_trimmed,
        );
        let confidence = (PRECEDING_WEIGHT * preceding_score
            + FOLLOWING_WEIGHT * following_score
            + POSITIONAL_WEIGHT * positional)
            .min(1.0);
        trace!(start, end, confidence, "scored candidate window");

        if best.as_ref().is_none_or(|b| confidence > b.confidence) {
            best = Some(SectionMatch {
                start,
                end,
                confidence,
            });
        }
        if confidence > EARLY_EXIT_CONFIDENCE {
            break;
        }
    }

    let mut found = best?;
    if found.confidence <= CONFIDENCE_FLOOR {
        warn!(
            confidence = found.confidence,
            "no section cleared the confidence floor"
        );
        return None;
    }
    while found.end < lines.len() && lines[found.end].trim().is_empty() {
        found.end += 1;
    }
    Some(found)
}

enum Edge {
    Leading,
    Trailing,
}

/// Tiered similarity between a window and a trimmed context string:
/// containment scores 1.0, an edge match 0.8, otherwise whitespace-token
/// overlap scaled to 0.6.
fn context_affinity(window: &str, context: &str, edge: Edge) -> f64 {
    if context.is_empty() {
        return 0.0;
    }
    let window = window.trim();
    if window.is_empty() {
        return 0.0;
    }
    if window.contains(context) || context.contains(window) {
        return 1.0;
    }
    let edge_match = match edge {
        Edge::Leading => window.starts_with(context) || context.starts_with(window),
        Edge::Trailing => window.ends_with(context) || context.ends_with(window),
    };
    if edge_match {
        return 0.8;
    }

    let window_tokens: AHashSet<&str> = window.split_whitespace().collect();
    let context_tokens: AHashSet<&str> = context.split_whitespace().collect();
    let largest = window_tokens.len().max(context_tokens.len());
    if largest == 0 {
        return 0.0;
    }
    let common = window_tokens.intersection(&context_tokens).count();
    common as f64 / largest as f64 * 0.6
}

/// Evidence from up to [`POSITIONAL_SPAN`] lines on each side of the
/// window: +0.5 when the block before contains the preceding context, +0.5
/// when the block after contains the following context.
fn positional_evidence(
    lines: &[&str],
    start: usize,
    end: usize,
    preceding: &str,
    following: &str,
) -> f64 {
    let mut evidence = 0.0;
    if !preceding.is_empty() && start > 0 {
        let from = start.saturating_sub(POSITIONAL_SPAN);
        let before: String = lines[from..start].concat();
        if before.contains(preceding) {
            evidence += 0.5;
        }
    }
    if !following.is_empty() && end < lines.len() {
        let to = (end + POSITIONAL_SPAN).min(lines.len());
        let after: String = lines[end..to].concat();
        if after.contains(following) {
            evidence += 0.5;
        }
    }
    evidence
}

/// Whether applying a delta to `provided` needs the section locator, given
/// the source the delta was generated from.
///
/// True when `provided` is a larger document containing the stored excerpt,
/// or when the two differ without either containing the other. False when
/// they are equal, when the stored source contains `provided` (the caller is
/// patching the very excerpt or a part of it), or when nothing was stored.
pub fn requires_truncated_handling(provided: &str, stored: Option<&str>) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    if provided == stored {
        false
    } else if provided.contains(stored) {
        true
    } else {
        !stored.contains(provided)
    }
}

/// Application type recorded at generation time: any excerpt evidence
/// (a start line, a captured context or a stored source snapshot) marks the
/// delta as needing truncated-source handling.
pub(crate) fn detect_application_type(
    source_start_line: Option<usize>,
    preceding_context: Option<&str>,
    following_context: Option<&str>,
    source_content: Option<&str>,
) -> ApplicationType {
    let has_context = preceding_context.is_some_and(|c| !c.is_empty())
        || following_context.is_some_and(|c| !c.is_empty());
    if source_start_line.is_some_and(|line| line > 0) || has_context || source_content.is_some() {
        ApplicationType::RequiresTruncatedSource
    } else {
        ApplicationType::RequiresFullSource
    }
}

/// Replace the located window's lines with `replacement`, preserving the
/// window's trailing newline and trailing blank line when the patched text
/// dropped them. A blank line introduced by the modification itself is kept
/// as produced.
pub(crate) fn splice_section(
    lines: &[&str],
    section: &SectionMatch,
    window_text: &str,
    replacement: String,
) -> String {
    let mut replacement = replacement;
    if window_text.ends_with('\n') && !replacement.ends_with('\n') {
        replacement.push('\n');
    }
    if window_text.ends_with("\n\n") && !replacement.ends_with("\n\n") {
        replacement.push('\n');
    }

    let mut result = String::with_capacity(
        lines.iter().map(|l| l.len()).sum::<usize>() + replacement.len(),
    );
    for line in &lines[..section.start] {
        result.push_str(line);
    }
    result.push_str(&replacement);
    for line in &lines[section.end..] {
        result.push_str(line);
    }
    result
}
