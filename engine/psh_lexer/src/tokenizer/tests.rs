use super::tokenize;
use crate::keywords::KeywordSets;
use crate::line_state::line_comment_flag;
use crate::styles::Style;
use pretty_assertions::assert_eq;
use psh_styler::StyledDocument;

fn kw() -> KeywordSets {
    KeywordSets::new(
        [
            "if", "else", "class", "enum", "break", "continue", "function", "filter", "foreach",
        ],
        ["int", "string"],
        ["get-item", "write-output"],
        ["gci"],
        ["pshome", "args", "error"],
    )
}

fn scan(src: &str) -> StyledDocument {
    let sets = kw();
    let mut doc = StyledDocument::new(src);
    let len = doc.len();
    tokenize(&mut doc, 0, len, Style::Default, &sets);
    doc
}

fn styles_of(src: &str) -> Vec<Style> {
    scan(src)
        .styles()
        .iter()
        .map(|&b| Style::from_byte(b))
        .collect()
}

/// Assert every byte of `needle`'s first occurrence in `src` has `style`.
fn assert_run(src: &str, needle: &str, style: Style) {
    let styles = styles_of(src);
    let Some(at) = src.find(needle) else {
        panic!("needle {needle:?} not found in {src:?}");
    };
    assert_eq!(
        &styles[at..at + needle.len()],
        vec![style; needle.len()].as_slice(),
        "styles of {needle:?} in {src:?}"
    );
}

/// Style of the first byte of `needle`'s first occurrence in `src`.
fn style_at(src: &str, needle: &str) -> Style {
    let styles = styles_of(src);
    let Some(at) = src.find(needle) else {
        panic!("needle {needle:?} not found in {src:?}");
    };
    styles[at]
}

// === Identifier Precedence ===

#[test]
fn keyword_beats_everything() {
    assert_run("if ($x) { }", "if", Style::Keyword);
}

#[test]
fn cmdlet_when_not_keyword() {
    assert_run("Get-Item $path", "Get-Item", Style::Cmdlet);
}

#[test]
fn alias_when_not_cmdlet() {
    assert_run("gci .", "gci", Style::Alias);
}

#[test]
fn call_shape_styles_as_function() {
    assert_run("bar(1)", "bar", Style::Function);
    // Space before the paren still reads as a call on the same line
    assert_run("bar (1)", "bar", Style::Function);
}

#[test]
fn plain_identifier_stays_identifier() {
    assert_run("bar 1", "bar", Style::Identifier);
}

#[test]
fn member_access_suppresses_contextual_styles() {
    // Breaking on `.` keeps the segment a plain identifier
    assert_run("foo.bar\n", "foo", Style::Identifier);
    // ...and carries the declaration context to the next segment
    assert_run("class A.B { }", "B", Style::Class);
}

#[test]
fn keyword_lookup_is_case_insensitive() {
    assert_run("IF ($x) { }", "IF", Style::Keyword);
    assert_run("GeT-iTeM .", "GeT-iTeM", Style::Cmdlet);
}

// === Declaration Contexts ===

#[test]
fn class_keyword_seeds_class_name() {
    let src = "class Animal { }";
    assert_run(src, "class", Style::Keyword);
    assert_run(src, "Animal", Style::Class);
}

#[test]
fn enum_keyword_seeds_enum_name() {
    assert_run("enum Color { }", "Color", Style::Enum);
}

#[test]
fn function_keyword_seeds_definition_name() {
    let src = "function Get-Total { }";
    assert_run(src, "Get-Total", Style::FunctionDefinition);
}

#[test]
fn break_seeds_label_context() {
    assert_run("break outer\n", "outer", Style::Label);
    assert_run("continue outer\n", "outer", Style::Label);
}

#[test]
fn context_does_not_survive_line_end() {
    // `function` at the end of one line must not classify the next line
    let src = "function\nTotal";
    assert_run(src, "Total", Style::Identifier);
}

#[test]
fn line_leading_colon_is_a_label() {
    assert_run(":outer foreach ($i in $x) { }", ":outer", Style::Label);
    // Not at line start: plain operator
    assert_eq!(style_at("$a :b", ":b"), Style::Operator);
}

// === Attribute vs Array Index ===

#[test]
fn bracket_at_line_start_opens_attribute_context() {
    let src = "[int]$x";
    assert_run(src, "int", Style::Type);
    assert_eq!(style_at(src, "["), Style::Operator);
}

#[test]
fn bracket_after_identifier_is_array_index() {
    let src = "$a[0]";
    assert_eq!(style_at(src, "["), Style::Operator);
    assert_run(src, "0", Style::Number);
    // `0` would style as Type if the bracket had opened attribute context
    let src2 = "$a[int]";
    assert_run(src2, "int", Style::Identifier);
}

#[test]
fn attribute_name_is_call_shaped_inside_brackets() {
    let src = "[Parameter(Mandatory)]";
    assert_run(src, "Parameter", Style::Attribute);
    // A bracketed name that is neither a known type nor call-shaped
    assert_run("[Animal]$pet", "Animal", Style::Class);
}

#[test]
fn dotted_name_inside_brackets_is_not_a_type() {
    // `int` is in the type set, but a preceding `.` means a qualified
    // name segment, not a bare type
    let src = "[x.int]$v";
    assert_run(src, "int", Style::Class);
}

#[test]
fn bracket_after_parameter_opens_attribute_context() {
    assert_run("-Is [int]", "int", Style::Type);
}

// === Strings ===

#[test]
fn doubled_quote_does_not_end_single_quoted_string() {
    let styles = styles_of("'it''s'");
    // No byte of the literal drops back to default
    assert!(styles.iter().all(|&s| s != Style::Default));
    assert_eq!(styles[0], Style::StringSq);
    assert_run("'it''s'", "''", Style::EscapeChar);
    assert_eq!(style_at("'it''s'", "s'"), Style::StringSq);
}

#[test]
fn single_quoted_string_closes_on_lone_quote() {
    let styles = styles_of("'ab' x");
    assert_eq!(styles[..4].to_vec(), vec![Style::StringSq; 4]);
    assert_eq!(styles[4], Style::Default);
}

#[test]
fn doubled_quote_escapes_inside_double_quoted_string() {
    let styles = styles_of("\"a\"\"b\" x");
    assert!(styles[..6].iter().all(|&s| s != Style::Default));
    assert_run("\"a\"\"b\" x", "\"\"", Style::EscapeChar);
}

#[test]
fn backtick_escape_inside_double_quoted_string() {
    assert_run("\"say `\"hi`\"\"", "`\"", Style::EscapeChar);
}

#[test]
fn backtick_in_default_state_is_an_escape() {
    let styles = styles_of("x `5 y");
    assert_eq!(styles[2], Style::EscapeChar);
    assert_eq!(styles[3], Style::EscapeChar);
    assert_eq!(styles[4], Style::Default);
}

#[test]
fn unterminated_string_runs_to_end_of_range() {
    let styles = styles_of("'never closed");
    assert!(styles.iter().all(|&s| s == Style::StringSq));
}

// === Here-Strings ===

#[test]
fn here_string_ignores_interior_quote() {
    let src = "@\"\nfoo \" bar\n\"@\n$x";
    let styles = styles_of(src);
    let Some(quote) = src.find("\" bar") else {
        panic!("marker missing");
    };
    assert_eq!(styles[quote], Style::HereStringDq);
    // Closing sequence is part of the literal; what follows is not
    assert_run(src, "\"@", Style::HereStringDq);
    assert_eq!(style_at(src, "$x"), Style::Variable);
}

#[test]
fn here_string_close_only_matches_at_line_start() {
    // `"@` mid-line does not close
    let src = "@\"\na \"@ b\nc\n\"@\n";
    let styles = styles_of(src);
    let Some(b) = src.find('b') else {
        panic!("marker missing");
    };
    assert_eq!(styles[b], Style::HereStringDq);
}

#[test]
fn single_here_string_does_not_interpolate() {
    let src = "@'\nvalue $x here\n'@\n";
    assert_run(src, "$x", Style::HereStringSq);
}

#[test]
fn double_here_string_interpolates() {
    let src = "@\"\nvalue $args here\n\"@\n";
    assert_run(src, "$args", Style::BuiltinVariable);
    assert_run(src, " here", Style::HereStringDq);
}

// === Variables & Interpolation ===

#[test]
fn two_byte_special_variables_are_builtin() {
    for name in ["$$", "$?", "$^", "$_"] {
        assert_run(&format!("{name} "), name, Style::BuiltinVariable);
    }
}

#[test]
fn predefined_variable_lookup_strips_sigil_and_case() {
    assert_run("$PSHome\n", "$PSHome", Style::BuiltinVariable);
    assert_run("$args\n", "$args", Style::BuiltinVariable);
    assert_run("$mine\n", "$mine", Style::Variable);
}

#[test]
fn splatted_variable_scans_like_dollar() {
    assert_run("@args\n", "@args", Style::BuiltinVariable);
    assert_run("@mine\n", "@mine", Style::Variable);
    // Bare `@` is an operator
    assert_eq!(style_at("@ ", "@"), Style::Operator);
}

#[test]
fn scope_qualifier_splits_into_three_tokens() {
    let src = "$global:total";
    assert_run(src, "$global", Style::VariableScope);
    assert_eq!(style_at(src, ":total"), Style::Operator);
    assert_run(src, "total", Style::Variable);
}

#[test]
fn brace_variable_spans_to_closing_brace() {
    let src = "${a b} x";
    assert_run(src, "${a b}", Style::BraceVariable);
    assert_eq!(style_at(src, " x"), Style::Default);
}

#[test]
fn interpolated_subexpression_reenters_code_and_returns() {
    let src = "\"a$(b)c\"";
    assert_run(src, "$(", Style::Operator2);
    assert_run(src, "b", Style::Identifier);
    assert_eq!(style_at(src, ")c"), Style::Operator2);
    assert_run(src, "c\"", Style::StringDq);
    // Balanced: nothing spills past the closing quote
    let doc = scan(src);
    assert_eq!(doc.line_state(0), 0);
}

#[test]
fn nested_subexpressions_unwind_in_order() {
    let src = "\"a$(b$(c)d)e\"";
    assert_run(src, "c", Style::Identifier);
    assert_run(src, "d", Style::Identifier);
    assert_run(src, "e\"", Style::StringDq);
    let doc = scan(src);
    assert_eq!(doc.line_state(0), 0);
}

#[test]
fn operators_inside_interpolation_use_nested_flavor() {
    let src = "\"n: $($a + $b)\"";
    assert_eq!(style_at(src, "+"), Style::Operator2);
    // Top-level operators stay plain
    assert_eq!(style_at("$a + $b", "+"), Style::Operator);
}

#[test]
fn variable_exit_resumes_enclosing_string() {
    assert_run("\"hi $name end\"", " end\"", Style::StringDq);
}

#[test]
fn open_interpolation_persists_in_line_state() {
    let src = "\"start $(\n1)\"\n";
    let doc = scan(src);
    assert_ne!(doc.line_state(0) >> 8, 0, "nesting stack must persist");
    assert_eq!(doc.line_state(1) >> 8, 0);
}

// === Numbers ===

#[test]
fn number_continuations() {
    assert_run("42 ", "42", Style::Number);
    assert_run("0x1F ", "0x1F", Style::Number);
    assert_run("1.5e+3 ", "1.5e+3", Style::Number);
    assert_run("10mb ", "10mb", Style::Number);
}

#[test]
fn range_operator_splits_numbers() {
    let src = "1..5";
    assert_eq!(style_at(src, "1"), Style::Number);
    assert_eq!(style_at(src, ".."), Style::Operator);
    assert_eq!(style_at(src, "5"), Style::Number);
}

#[test]
fn digit_glued_to_identifier_is_not_a_number() {
    assert_run("abc1 ", "abc1", Style::Identifier);
}

// === Parameters ===

#[test]
fn dash_identifier_is_a_parameter() {
    assert_run("Get-Item -Recurse", "-Recurse", Style::Parameter);
}

#[test]
fn dash_digit_is_an_operator_then_number() {
    let src = "$a -5";
    assert_eq!(style_at(src, "-5"), Style::Operator);
    assert_run(src, "5", Style::Number);
}

// === Comments & Directives ===

#[test]
fn line_comment_runs_to_line_end_and_flags_line() {
    let src = "# note\n$x";
    assert_run(src, "# note", Style::CommentLine);
    assert_eq!(style_at(src, "$x"), Style::Variable);
    let doc = scan(src);
    assert!(line_comment_flag(doc.line_state(0)));
}

#[test]
fn trailing_comment_does_not_flag_line() {
    let doc = scan("$x = 1 # note\n");
    assert!(!line_comment_flag(doc.line_state(0)));
}

#[test]
fn region_directive_keeps_style_and_clears_flag() {
    let src = "#region init\n";
    assert_run(src, "#region", Style::Directive);
    assert_run(src, " init", Style::CommentLine);
    let doc = scan(src);
    assert!(!line_comment_flag(doc.line_state(0)));
}

#[test]
fn requires_and_endregion_are_directives() {
    assert_run("#requires -Version 7\n", "#requires", Style::Directive);
    assert_run("#endregion\n", "#endregion", Style::Directive);
}

#[test]
fn unrecognized_hash_word_downgrades_to_comment() {
    let src = "#random text\n";
    assert_run(src, "#random text", Style::CommentLine);
    let doc = scan(src);
    assert!(line_comment_flag(doc.line_state(0)));
}

#[test]
fn block_comment_spans_lines_and_closes_inline() {
    let src = "<# one\ntwo #> $x";
    assert_run(src, "<# one", Style::CommentBlock);
    assert_run(src, "two #>", Style::CommentBlock);
    assert_eq!(style_at(src, "$x"), Style::Variable);
}

#[test]
fn doc_tag_inside_block_comment() {
    let src = "<#\n.SYNOPSIS\nDoes things.\n#>";
    assert_run(src, ".SYNOPSIS", Style::CommentTag);
    assert_run(src, "Does", Style::CommentBlock);
}

#[test]
fn doc_tag_requires_line_leading_dot() {
    let src = "<# see .NOTES #>";
    assert_run(src, ".NOTES", Style::CommentBlock);
}

// === Restartability ===

const SCRIPT: &str = "$total = 0\n\
function Get-Total {\n\
    \"count: $($total + 1) end\"\n\
}\n\
@\"\n\
inside $total text\n\
\"@\n\
<# block\n\
comment #>\n\
# note\n\
Get-Item -Path $mine\n";

#[test]
fn rescan_from_every_line_matches_full_scan() {
    let sets = kw();
    let mut full = StyledDocument::new(SCRIPT);
    let full_len = full.len();
    tokenize(&mut full, 0, full_len, Style::Default, &sets);

    for line in 1..full.line_count() {
        let start = full.line_start(line);
        if start >= full.len() {
            continue;
        }
        let mut doc = StyledDocument::new(SCRIPT);
        for prior in 0..line {
            doc.set_line_state(prior, full.line_state(prior));
        }
        let init = Style::from_byte(full.styles()[start as usize - 1]);
        let len = doc.len();
        tokenize(&mut doc, start, len - start, init, &sets);
        assert_eq!(
            &doc.styles()[start as usize..],
            &full.styles()[start as usize..],
            "resume at line {line} diverged"
        );
    }
}

#[test]
fn rescan_restores_line_states_too() {
    let sets = kw();
    let mut full = StyledDocument::new(SCRIPT);
    let full_len = full.len();
    tokenize(&mut full, 0, full_len, Style::Default, &sets);

    let line = 5; // inside the here-string
    let start = full.line_start(line);
    let mut doc = StyledDocument::new(SCRIPT);
    for prior in 0..line {
        doc.set_line_state(prior, full.line_state(prior));
    }
    let init = Style::from_byte(full.styles()[start as usize - 1]);
    let len = doc.len();
    tokenize(&mut doc, start, len - start, init, &sets);
    for l in line..full.line_count() {
        assert_eq!(doc.line_state(l), full.line_state(l), "state of line {l}");
    }
}

#[test]
fn multiline_interpolation_resumes_through_line_state() {
    let src = "\"head $(\n$args\n) tail\"\nrest";
    let sets = kw();
    let mut full = StyledDocument::new(src);
    let full_len = full.len();
    tokenize(&mut full, 0, full_len, Style::Default, &sets);
    assert_run_on(&full, src, "$args", Style::BuiltinVariable);
    assert_run_on(&full, src, " tail\"", Style::StringDq);
    assert_run_on(&full, src, "rest", Style::Identifier);

    // Resume on the closing line using only the persisted state
    let line = 2;
    let start = full.line_start(line);
    let mut doc = StyledDocument::new(src);
    for prior in 0..line {
        doc.set_line_state(prior, full.line_state(prior));
    }
    let init = Style::from_byte(full.styles()[start as usize - 1]);
    let len = doc.len();
    tokenize(&mut doc, start, len - start, init, &sets);
    assert_eq!(&doc.styles()[start as usize..], &full.styles()[start as usize..]);
}

fn assert_run_on(doc: &StyledDocument, src: &str, needle: &str, style: Style) {
    let Some(at) = src.find(needle) else {
        panic!("needle {needle:?} not found");
    };
    let got: Vec<Style> = doc.styles()[at..at + needle.len()]
        .iter()
        .map(|&b| Style::from_byte(b))
        .collect();
    assert_eq!(got, vec![style; needle.len()], "styles of {needle:?}");
}
