//! Serialization of a hierarchical recognition result into annotated markup.
//!
//! A single forward pass over the result cursor, O(symbols), with two
//! pieces of cross-word state (paragraph open, emphasis open) and one
//! per-word decision (confidence annotation). Italic runs are rendered
//! with a `<strong>` tag and low-confidence words with a `<font conf=..>`
//! span; the two spans are not guaranteed to nest consistently relative to
//! each other, and the per-step emission order is kept as-is rather than
//! re-ordered into a canonical nesting.

use std::fmt::Write;

use crate::cursor::{PageIteratorLevel, ResultCursor};

/// Words below this confidence (0-100) get a confidence annotation.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 70.0;

/// Walk the cursor from its current position to the end of the result and
/// produce the annotated markup document.
pub fn write_annotated_markup(cursor: &mut dyn ResultCursor, confidence_threshold: f32) -> String {
    let mut out = String::new();
    let mut emphasis_open = false;
    let mut paragraph_open = false;

    while !cursor.past_end(PageIteratorLevel::Block) {
        if cursor.past_end(PageIteratorLevel::Word) {
            cursor.advance(PageIteratorLevel::Word);
            continue;
        }

        if cursor.at_beginning_of(PageIteratorLevel::Paragraph) {
            if paragraph_open {
                out.push_str("</p>");
            }
            out.push_str("<p>");
            paragraph_open = true;
        }

        let attributes = cursor.font_attributes();
        let confidence = cursor.confidence(PageIteratorLevel::Word);

        if attributes.italic && !emphasis_open {
            out.push_str("<strong>");
            emphasis_open = true;
        } else if !attributes.italic && emphasis_open {
            out.push_str("</strong>");
            emphasis_open = false;
        }

        let word = cursor.text(PageIteratorLevel::Word).unwrap_or_default();
        let is_space = word == " ";
        let annotate_confidence = confidence < confidence_threshold && !is_space;
        if annotate_confidence {
            let _ = write!(out, "<font conf='{}' color='#DE2222'>", confidence as i32);
        }

        // Emit the word's symbols until the block ends or the next word
        // begins.
        loop {
            if let Some(symbol) = cursor.text(PageIteratorLevel::Symbol) {
                push_symbol(&mut out, &symbol);
            }
            cursor.advance(PageIteratorLevel::Symbol);
            if cursor.past_end(PageIteratorLevel::Block) || cursor.at_beginning_of(PageIteratorLevel::Word) {
                break;
            }
        }

        if annotate_confidence {
            out.push_str("</font>");
        }
        out.push(' ');
    }

    if emphasis_open {
        out.push_str("</strong>");
    }
    if paragraph_open {
        out.push_str("</p>");
    }
    out
}

/// Append one symbol, escaping the five markup-sensitive characters.
/// Multi-character symbols are emitted verbatim.
fn push_symbol(out: &mut String, symbol: &str) {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(single), None) => match single {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        },
        (Some(_), Some(_)) => out.push_str(symbol),
        (None, _) => {}
    }
}
