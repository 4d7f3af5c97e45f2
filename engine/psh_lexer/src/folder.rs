//! Fold-level computation driven by the tokenizer's styles.
//!
//! A second pass over an already-styled range. Each line gets a fold
//! cell:
//!
//! ```text
//! bits  0..13  fold level at the start of the line (base 0x400)
//! bit   13     header flag: a fold region opens on this line
//! bits 16..32  fold level at the end of the line, read back by the
//!              next incremental pass to resume
//! ```
//!
//! Level deltas come from three sources: entering/leaving a string-like
//! or block-comment span (one increment per span regardless of content),
//! bracket operators, and line-comment contiguity: a run of whole-line
//! comments folds as one region, with the deltas derived from the
//! comment flags of the neighboring lines rather than from the text.

use psh_styler::StyledDocument;
use tracing::trace;

use crate::line_state::line_comment_flag;
use crate::styles::Style;

/// Base fold level of an unnested line.
pub const FOLD_LEVEL_BASE: u32 = 0x400;
/// OR'd into the low half of the cell on lines that open a region.
pub const FOLD_HEADER_FLAG: u32 = 0x2000;

const FOLD_NEXT_SHIFT: u32 = 16;

/// Fold level at the end of `line`, as persisted by a previous pass.
fn level_at_end(doc: &StyledDocument, line: u32) -> i32 {
    #[allow(clippy::cast_possible_wrap, reason = "levels are far below i32::MAX")]
    let level = (doc.fold_level(line) >> FOLD_NEXT_SHIFT) as i32;
    level
}

fn comment_flag(doc: &StyledDocument, line: u32) -> i32 {
    i32::from(line_comment_flag(doc.line_state(line)))
}

/// Styles whose spans fold as a unit.
fn is_multiline_span(style: Style) -> bool {
    matches!(
        style,
        Style::CommentBlock
            | Style::StringSq
            | Style::HereStringSq
            | Style::StringDq
            | Style::HereStringDq
    )
}

/// Position of a lone `{` opening the body of `line`'s construct from the
/// *next* line, if that is all the next line holds (trailing blanks and
/// comments allowed). Such a brace folds onto `line` instead of starting
/// its own region.
fn brace_on_next_line(doc: &StyledDocument, line: u32) -> Option<u32> {
    if line + 1 >= doc.line_count() {
        return None;
    }
    let start = doc.line_start(line + 1);
    let end = doc.line_end(line + 1);
    let brace = doc.skip_space_tab(start, end);
    if brace >= end
        || doc.byte_at(brace) != b'{'
        || Style::from_byte(doc.style_at(brace)) != Style::Operator
    {
        return None;
    }
    let mut pos = brace + 1;
    while pos < end {
        match doc.byte_at(pos) {
            b' ' | b'\t' => {}
            _ => {
                if !Style::from_byte(doc.style_at(pos)).is_space_equiv() {
                    return None;
                }
            }
        }
        pos += 1;
    }
    Some(brace)
}

/// Assign a fold cell to every line covered by `start..start + length`.
///
/// `start` must be a line boundary; `init_style` is the style in effect
/// there (the style of the preceding byte). The range must already be
/// styled by [`tokenize`](crate::tokenize).
pub fn fold(doc: &mut StyledDocument, start: u32, length: u32, init_style: Style) {
    trace!(start, length, "fold range");
    let end_pos = start.saturating_add(length).min(doc.len());
    let mut start_pos = start;
    let mut line_current = doc.line_of(start);

    #[allow(clippy::cast_possible_wrap, reason = "base is a small constant")]
    let base = FOLD_LEVEL_BASE as i32;
    let mut level_current = base;
    let mut line_comment_prev = 0i32;
    if line_current > 0 {
        level_current = level_at_end(doc, line_current - 1);
        line_comment_prev = comment_flag(doc, line_current - 1);
        if let Some(brace) = brace_on_next_line(doc, line_current - 1) {
            // That brace was folded onto the previous line already.
            start_pos = brace + 1;
        }
    }

    let mut level_next = level_current;
    let mut line_comment_current = comment_flag(doc, line_current);
    let mut line_start_next = doc.line_start(line_current + 1).min(end_pos);
    let mut style = init_style;
    let mut style_next = Style::from_byte(doc.style_at(start_pos));
    let mut visible_chars = 0u32;

    while start_pos < end_pos {
        let style_prev = style;
        style = style_next;
        start_pos += 1;
        style_next = Style::from_byte(doc.style_at(start_pos));

        if is_multiline_span(style) {
            if style != style_prev {
                level_next += 1;
            }
            if style != style_next {
                level_next -= 1;
            }
        } else if matches!(style, Style::Operator | Style::Operator2) {
            match doc.byte_at(start_pos - 1) {
                b'{' | b'[' | b'(' => level_next += 1,
                b'}' | b']' | b')' => level_next -= 1,
                _ => {}
            }
        }

        if visible_chars == 0 && !style.is_space_equiv() {
            visible_chars += 1;
        }

        if start_pos == line_start_next {
            let line_comment_next = comment_flag(doc, line_current + 1);
            level_next = level_next.max(base);
            if line_comment_current != 0 {
                // Keep a contiguous comment block flat: only its edges
                // move the level.
                level_next += line_comment_next - line_comment_prev;
            } else if visible_chars != 0 {
                if let Some(brace) = brace_on_next_line(doc, line_current) {
                    level_next += 1;
                    start_pos = brace + 1;
                    style = Style::Operator;
                    style_next = Style::from_byte(doc.style_at(start_pos));
                }
            }

            #[allow(clippy::cast_sign_loss, reason = "clamped to base above")]
            let mut cell = (level_current.max(0) as u32) | ((level_next.max(0) as u32) << 16);
            if level_current < level_next {
                cell |= FOLD_HEADER_FLAG;
            }
            doc.set_fold_level(line_current, cell);

            line_current += 1;
            line_start_next = doc.line_start(line_current + 1).min(end_pos);
            level_current = level_next;
            line_comment_prev = line_comment_current;
            line_comment_current = line_comment_next;
        }
    }
}
