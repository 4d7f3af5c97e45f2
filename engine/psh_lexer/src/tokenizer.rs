//! Single-pass, restartable tokenizer for PowerShell source.
//!
//! One invocation styles every byte of a contiguous range and saves a
//! packed state integer for every completed line. The scan can start at
//! any line boundary: the caller passes the style in effect at the start
//! offset, and the previous line's saved state restores the interpolation
//! nesting stack. Everything else (declaration context, visible-character
//! count, last non-space byte) is per-line and starts cold, which is why
//! line boundaries are the only legal resume points.
//!
//! There is no error path. Unterminated strings, truncated directives and
//! unmatched brackets keep their current style to the end of the range;
//! an editor must color whatever it is given.

use psh_styler::{ScanContext, StyledDocument};
use smallvec::SmallVec;
use tracing::trace;

use crate::keywords::KeywordSets;
use crate::line_state::{pack_line_state, take_and_pop, unpack_nested, NestedStack};
use crate::styles::{
    is_graphic, is_identifier_start, is_number_continue, is_number_start, is_psh_identifier_char,
    is_space, is_special_variable, is_variable_char, prefer_array_index, Style,
};

/// Declaration context seeded by the last classified token, biasing how
/// the next identifier is styled. Contexts are mutually exclusive and
/// never survive a line boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeclContext {
    None,
    /// After `break`/`continue`: next identifier is a loop label.
    Label,
    /// After `class`: next identifier is the class being declared.
    Class,
    /// After `enum`: next identifier is the enum being declared.
    Enum,
    /// Inside `[...]` attribute brackets.
    Attribute,
    /// After `function`/`filter`: next identifier is the name defined.
    Function,
}

impl DeclContext {
    /// Style an identifier takes under this context.
    fn style(self) -> Style {
        match self {
            DeclContext::None => Style::Default,
            DeclContext::Label => Style::Label,
            DeclContext::Class => Style::Class,
            DeclContext::Enum => Style::Enum,
            DeclContext::Attribute => Style::Attribute,
            DeclContext::Function => Style::FunctionDefinition,
        }
    }
}

/// Dispatch a `$` sigil seen in default or string-body context.
///
/// `$(` opens a sub-expression (operator flavor depends on nesting),
/// `${` a brace variable, a variable or special character a plain
/// variable. When the style changes, the sigil is consumed and the
/// enclosing style is pushed so the construct's close can restore it,
/// except when entering from plain unnested default, which resumes via
/// the empty-stack fallback instead.
fn scan_variable_sigil(sc: &mut ScanContext<'_, Style>, nested: &mut NestedStack) {
    let enclosing = sc.state();
    if sc.ch_next == b'(' {
        sc.set_state(if enclosing == Style::Default && nested.is_empty() {
            Style::Operator
        } else {
            Style::Operator2
        });
    } else if sc.ch_next == b'{' {
        sc.set_state(Style::BraceVariable);
    } else if is_variable_char(sc.ch_next) || is_special_variable(sc.ch_next) {
        sc.set_state(Style::Variable);
    }
    if enclosing != sc.state() {
        sc.forward();
        if enclosing != Style::Default || !nested.is_empty() {
            nested.push(enclosing);
        }
    }
}

/// Style every byte of `start..start + length` and persist per-line state.
///
/// `start` must be a line boundary (or 0); `init_style` is the style a
/// prior scan left in effect there. Keyword sets are queried, never
/// modified.
pub fn tokenize(
    doc: &mut StyledDocument,
    start: u32,
    length: u32,
    init_style: Style,
    keywords: &KeywordSets,
) {
    debug_assert!(
        doc.line_start(doc.line_of(start)) == start,
        "scan must start at a line boundary"
    );
    trace!(start, length, ?init_style, "tokenize range");

    let mut line_comment = false;
    let mut decl = DeclContext::None;
    // Byte immediately before the current identifier's start.
    let mut ch_before = 0u8;
    let mut ch_prev_non_white = 0u8;
    let mut style_prev_non_white = Style::Default;
    let mut visible_chars = 0u32;
    // Style to restore when the escape-character state ends.
    let mut outer_style = Style::Default;
    let mut nested: NestedStack = SmallVec::new();

    let mut sc = ScanContext::new(doc, start, length, init_style);
    if sc.current_line() > 0 {
        unpack_nested(sc.line_state(sc.current_line() - 1), &mut nested);
    }

    while sc.more() {
        match sc.state() {
            // Operators are a single byte wide.
            Style::Operator | Style::Operator2 => {
                sc.set_state(Style::Default);
            }

            Style::Number => {
                if !is_number_continue(sc.ch_prev, sc.ch, sc.ch_next) {
                    sc.set_state(Style::Default);
                }
            }

            Style::StringSq => {
                if sc.ch == b'\'' {
                    if sc.ch_next == b'\'' {
                        // Doubled quote: one escape unit, string continues.
                        outer_style = Style::StringSq;
                        sc.set_state(Style::EscapeChar);
                        sc.forward();
                    } else {
                        sc.forward_set_state(Style::Default);
                    }
                }
            }

            Style::HereStringSq => {
                if sc.at_line_start && sc.match2(b'\'', b'@') {
                    sc.forward();
                    sc.forward_set_state(Style::Default);
                }
            }

            Style::StringDq | Style::HereStringDq => {
                if sc.ch == b'`' || (sc.state() == Style::StringDq && sc.match2(b'"', b'"')) {
                    outer_style = sc.state();
                    sc.set_state(Style::EscapeChar);
                    sc.forward();
                } else if sc.ch == b'$' {
                    scan_variable_sigil(&mut sc, &mut nested);
                } else if sc.ch == b'"'
                    && (sc.state() != Style::HereStringDq
                        || (sc.at_line_start && sc.ch_next == b'@'))
                {
                    if sc.state() == Style::HereStringDq {
                        sc.forward();
                    }
                    sc.forward_set_state(Style::Default);
                }
            }

            Style::EscapeChar => {
                // Return to the interrupted style and re-evaluate this
                // byte under it.
                sc.set_state(outer_style);
                continue;
            }

            Style::Variable => {
                if sc.ch == b':' && is_variable_char(sc.ch_next) {
                    // $scope:name: the prefix becomes a scope qualifier,
                    // the colon an operator, then the variable resumes.
                    sc.change_state(Style::VariableScope);
                    sc.set_state(Style::Operator);
                    sc.forward_set_state(Style::Variable);
                } else if !is_variable_char(sc.ch) {
                    let len = sc.length_current();
                    if len == 2 {
                        if is_special_variable(sc.ch_prev) {
                            sc.change_state(Style::BuiltinVariable);
                        }
                    } else if len >= 4 {
                        let mut buf = [0u8; 64];
                        let text = sc.current_lowered(&mut buf);
                        let name = match text.first() {
                            Some(b'$' | b'@') => &text[1..],
                            _ => text,
                        };
                        if keywords.is_predefined_variable(name) {
                            sc.change_state(Style::BuiltinVariable);
                        }
                    }
                    sc.set_state(take_and_pop(&mut nested));
                    continue;
                }
            }

            Style::BraceVariable => {
                if sc.ch == b'`' {
                    outer_style = Style::BraceVariable;
                    sc.set_state(Style::EscapeChar);
                    sc.forward();
                } else if sc.ch == b'}' {
                    sc.forward_set_state(take_and_pop(&mut nested));
                    continue;
                }
            }

            Style::Identifier | Style::Parameter | Style::Label => {
                if !is_psh_identifier_char(sc.ch) {
                    if sc.state() == Style::Identifier {
                        let mut buf = [0u8; 128];
                        let text = sc.current_lowered(&mut buf);
                        if keywords.is_keyword(text) {
                            sc.change_state(Style::Keyword);
                            decl = match text {
                                b"class" => DeclContext::Class,
                                b"enum" => DeclContext::Enum,
                                b"break" | b"continue" => DeclContext::Label,
                                b"function" | b"filter" => DeclContext::Function,
                                _ => decl,
                            };
                        } else if keywords.is_cmdlet(text) {
                            sc.change_state(Style::Cmdlet);
                        } else if keywords.is_alias(text) {
                            sc.change_state(Style::Alias);
                        } else if sc.ch != b'.' && sc.ch != b':' {
                            // Not a member access or scope qualification:
                            // contextual classification may apply.
                            let ch_next = sc.line_next_char();
                            if decl == DeclContext::Attribute {
                                if ch_before != b'.' && keywords.is_type(text) {
                                    sc.change_state(Style::Type);
                                } else if ch_next == b'(' {
                                    sc.change_state(Style::Attribute);
                                } else {
                                    sc.change_state(Style::Class);
                                }
                            } else if decl != DeclContext::None {
                                sc.change_state(decl.style());
                            } else if ch_next == b'(' {
                                sc.change_state(Style::Function);
                            }
                        }
                        // A keyword keeps the context it just seeded; a
                        // qualified name keeps it for its next segment.
                        if sc.state() != Style::Keyword && sc.ch != b'.' && sc.ch != b':' {
                            decl = DeclContext::None;
                        }
                    }
                    sc.set_state(Style::Default);
                }
            }

            Style::CommentLine => {
                if sc.at_line_start {
                    sc.set_state(Style::Default);
                }
            }

            Style::Directive => {
                if !sc.ch.is_ascii_alphabetic() {
                    let mut buf = [0u8; 16];
                    let text: &[u8] = if sc.ch <= b' ' {
                        sc.current_lowered(&mut buf)
                    } else {
                        &[]
                    };
                    if matches!(text, b"#requires" | b"#region" | b"#endregion") {
                        // Structural directive: not a foldable comment line.
                        line_comment = false;
                        sc.set_state(Style::CommentLine);
                    } else {
                        sc.change_state(Style::CommentLine);
                    }
                }
            }

            Style::CommentBlock => {
                if sc.ch == b'.' && visible_chars == 0 && sc.ch_next.is_ascii_alphabetic() {
                    sc.set_state(Style::CommentTag);
                } else if sc.match2(b'#', b'>') {
                    sc.forward();
                    sc.forward_set_state(Style::Default);
                }
            }

            Style::CommentTag => {
                if sc.ch <= b' ' {
                    sc.set_state(Style::CommentBlock);
                } else if !sc.ch.is_ascii_alphabetic() {
                    sc.change_state(Style::CommentBlock);
                    continue;
                }
            }

            _ => {}
        }

        if sc.state() == Style::Default {
            if sc.ch == b'#' {
                sc.set_state(Style::CommentLine);
                if visible_chars == 0 {
                    line_comment = true;
                    // #requires / #region / #endregion candidates.
                    let next = sc.ch_next.to_ascii_lowercase();
                    if next == b'r' || next == b'e' {
                        sc.change_state(Style::Directive);
                    }
                }
            } else if sc.match2(b'<', b'#') {
                sc.set_state(Style::CommentBlock);
                sc.forward();
            } else if sc.ch == b'@' {
                if sc.ch_next == b'"' {
                    sc.set_state(Style::HereStringDq);
                    sc.forward();
                } else if sc.ch_next == b'\'' {
                    sc.set_state(Style::HereStringSq);
                    sc.forward();
                } else if is_variable_char(sc.ch_next) {
                    // Splatted variable: @args scans like $args.
                    sc.set_state(Style::Variable);
                } else {
                    sc.set_state(Style::Operator);
                }
            } else if sc.ch == b'"' {
                sc.set_state(Style::StringDq);
            } else if sc.ch == b'\'' {
                sc.set_state(Style::StringSq);
            } else if sc.ch == b'$' {
                scan_variable_sigil(&mut sc, &mut nested);
            } else if sc.ch == b'`' {
                outer_style = Style::Default;
                sc.set_state(Style::EscapeChar);
                sc.forward();
            } else if is_number_start(sc.ch_prev, sc.ch, sc.ch_next) {
                sc.set_state(Style::Number);
            } else if sc.ch == b'-' && is_identifier_start(sc.ch_next) {
                sc.set_state(Style::Parameter);
            } else if visible_chars == 0 && sc.ch == b':' && is_identifier_start(sc.ch_next) {
                sc.set_state(Style::Label);
            } else if is_identifier_start(sc.ch) {
                ch_before = ch_prev_non_white;
                sc.set_state(Style::Identifier);
            } else if is_graphic(sc.ch) {
                sc.set_state(Style::Operator);
                if !nested.is_empty() {
                    sc.change_state(Style::Operator2);
                    if sc.ch == b'(' {
                        // A fresh sub-expression inside the interpolation.
                        nested.push(Style::Default);
                    } else if sc.ch == b')' {
                        outer_style = take_and_pop(&mut nested);
                        sc.forward_set_state(outer_style);
                        continue;
                    }
                } else if decl == DeclContext::None && sc.ch == b'[' {
                    // Attribute bracket unless the left context reads as
                    // an array index.
                    if visible_chars == 0
                        || style_prev_non_white == Style::Parameter
                        || !prefer_array_index(ch_prev_non_white)
                    {
                        decl = DeclContext::Attribute;
                    }
                } else if decl == DeclContext::Attribute && (sc.ch == b'(' || sc.ch == b']') {
                    decl = DeclContext::None;
                }
            }
        }

        if !is_space(sc.ch) {
            visible_chars += 1;
            if !sc.state().is_space_equiv() {
                ch_prev_non_white = sc.ch;
                style_prev_non_white = sc.state();
            }
        }
        if sc.at_line_end() {
            let line = sc.current_line();
            sc.set_line_state(line, pack_line_state(line_comment, &nested));
            line_comment = false;
            visible_chars = 0;
            decl = DeclContext::None;
        }
        sc.forward();
    }

    sc.complete();
}

#[cfg(test)]
mod tests;
