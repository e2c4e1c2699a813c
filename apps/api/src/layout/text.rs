//! Greedy line breaking against the static font metrics.
//!
//! Same algorithm as a word processor's first-fit: words are appended to the
//! current line until the next one would overflow, then a new line starts.
//! Explicit `\n` always starts a new line. A single word wider than the line is
//! broken between characters so no line ever exceeds `max_width_pt`.

use crate::layout::font_metrics::{get_metrics, Font, FontMetricTable};

/// Wraps `text` into lines no wider than `max_width_pt` at `size_pt`.
///
/// Blank input yields no lines. Blank paragraphs between `\n`s are kept as empty
/// lines so the caller's vertical rhythm matches the source text.
pub fn wrap_text(text: &str, font: Font, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let metrics = get_metrics(font);
    // Work in em units so the comparison matches `measure_str` directly.
    let max_width = (max_width_pt / size_pt).max(0.0);

    let mut lines = Vec::new();
    for paragraph in text.trim_end().split('\n') {
        wrap_paragraph(paragraph.trim_end_matches('\r'), metrics, max_width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, metrics: &FontMetricTable, max_width: f32, out: &mut Vec<String>) {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    if words.is_empty() {
        out.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let word_w = metrics.measure_str(word);
        let space_w = if current.is_empty() {
            0.0
        } else {
            metrics.space_width
        };

        if current_width + space_w + word_w <= max_width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width += space_w + word_w;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if word_w <= max_width {
            current.push_str(word);
            current_width = word_w;
        } else {
            // Break an over-long word (URLs, long compound names) by character.
            for c in word.chars() {
                let c_w = metrics.char_width(c);
                if !current.is_empty() && current_width + c_w > max_width {
                    out.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += c_w;
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}
