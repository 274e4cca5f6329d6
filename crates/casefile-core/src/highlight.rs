//! Matched-span highlighting with trimmed context
//!
//! Matching is case-insensitive and works on characters, not bytes, so window
//! sizes count characters and CJK text is never split mid-codepoint. The
//! rendered text keeps the original casing.

use crate::config::HighlightStyle;

/// Wraps every occurrence of any token in `text` with the style's markers.
///
/// Overlapping or touching matches merge into one span. Runs of unmatched text
/// are trimmed to `window` characters on each side of a span, with the
/// ellipsis marking each cut. Text with no match is returned unchanged.
pub fn highlight_matches(
    text: &str,
    tokens: &[String],
    window: usize,
    style: &HighlightStyle,
) -> String {
    if text.is_empty() || tokens.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().map(|&c| fold(c)).collect();

    let mut matches = Vec::new();
    for token in tokens {
        let needle: Vec<char> = token.chars().map(fold).collect();
        if needle.is_empty() || needle.len() > folded.len() {
            continue;
        }
        for start in 0..=(folded.len() - needle.len()) {
            if folded[start..start + needle.len()] == needle[..] {
                matches.push((start, start + needle.len()));
            }
        }
    }

    if matches.is_empty() {
        return text.to_string();
    }

    let spans = merge_spans(matches);

    let mut out = String::with_capacity(text.len() + spans.len() * 8);
    let mut last_end = 0;
    for (i, (start, end)) in spans.into_iter().enumerate() {
        let gap = start - last_end;
        if i == 0 {
            if gap > window {
                out.push_str(&style.ellipsis);
                out.push(' ');
            }
            out.extend(&chars[start - gap.min(window)..start]);
        } else if gap > 2 * window {
            out.extend(&chars[last_end..last_end + window]);
            out.push(' ');
            out.push_str(&style.ellipsis);
            out.push(' ');
            out.extend(&chars[start - window..start]);
        } else {
            out.extend(&chars[last_end..start]);
        }
        out.push_str(&style.open);
        out.extend(&chars[start..end]);
        out.push_str(&style.close);
        last_end = end;
    }

    let context_end = chars.len().min(last_end + window);
    out.extend(&chars[last_end..context_end]);
    if context_end < chars.len() {
        out.push(' ');
        out.push_str(&style.ellipsis);
    }

    out
}

fn merge_spans(mut matches: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    matches.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(matches.len());
    for (start, end) in matches {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
