//! Style catalog and byte classification for PowerShell source.
//!
//! Style codes are the per-byte output of the tokenizer and the input of
//! the folder. The discriminants are the on-disk byte values in the
//! document's style buffer, so the ordering is part of the layout:
//! comment styles sit directly after `Default` so that "space-equivalent"
//! (ignorable for token-adjacency decisions) is a single comparison.
//!
//! Classification works on raw bytes. Bytes at 0x80 and above are treated
//! as identifier characters, which keeps multi-byte UTF-8 sequences glued
//! to the identifier or variable token they appear in.

/// Token category assigned to every scanned byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Style {
    Default = 0,
    CommentLine = 1,
    CommentBlock = 2,
    /// Doc-tag inside a block comment (`.SYNOPSIS` and friends).
    CommentTag = 3,
    /// Structural line comment: `#requires`, `#region`, `#endregion`.
    Directive = 4,
    Number = 5,
    StringSq = 6,
    HereStringSq = 7,
    StringDq = 8,
    HereStringDq = 9,
    /// Backtick escape or doubled-quote unit; spans the escape sequence.
    EscapeChar = 10,
    Variable = 11,
    /// Scope qualifier of a variable (`$script:` up to the colon).
    VariableScope = 12,
    BuiltinVariable = 13,
    /// `${...}` form.
    BraceVariable = 14,
    Identifier = 15,
    /// `-Name` command parameter.
    Parameter = 16,
    /// `:name` loop label.
    Label = 17,
    Keyword = 18,
    Cmdlet = 19,
    Alias = 20,
    Type = 21,
    Class = 22,
    Enum = 23,
    Attribute = 24,
    /// Name being declared by `function`/`filter`.
    FunctionDefinition = 25,
    /// Identifier called like a function (followed by `(`).
    Function = 26,
    Operator = 27,
    /// Operator inside an interpolated sub-expression; folds like
    /// `Operator` but marks that the nesting stack was non-empty.
    Operator2 = 28,
}

impl From<Style> for u8 {
    #[inline]
    fn from(style: Style) -> u8 {
        style as u8
    }
}

impl Style {
    /// Decode a style buffer byte. Unknown bytes (never written by this
    /// engine) decode to `Default`.
    pub fn from_byte(byte: u8) -> Style {
        match byte {
            1 => Style::CommentLine,
            2 => Style::CommentBlock,
            3 => Style::CommentTag,
            4 => Style::Directive,
            5 => Style::Number,
            6 => Style::StringSq,
            7 => Style::HereStringSq,
            8 => Style::StringDq,
            9 => Style::HereStringDq,
            10 => Style::EscapeChar,
            11 => Style::Variable,
            12 => Style::VariableScope,
            13 => Style::BuiltinVariable,
            14 => Style::BraceVariable,
            15 => Style::Identifier,
            16 => Style::Parameter,
            17 => Style::Label,
            18 => Style::Keyword,
            19 => Style::Cmdlet,
            20 => Style::Alias,
            21 => Style::Type,
            22 => Style::Class,
            23 => Style::Enum,
            24 => Style::Attribute,
            25 => Style::FunctionDefinition,
            26 => Style::Function,
            27 => Style::Operator,
            28 => Style::Operator2,
            _ => Style::Default,
        }
    }

    /// Default and comment styles: invisible to the "last non-space
    /// character" bookkeeping and to the folder's visibility counter.
    #[inline]
    pub fn is_space_equiv(self) -> bool {
        self <= Style::CommentTag
    }
}

// === Byte classification ===

#[inline]
pub(crate) fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

#[inline]
pub(crate) fn is_identifier_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Characters that may appear in a `$name` variable body.
#[inline]
pub(crate) fn is_variable_char(b: u8) -> bool {
    is_identifier_char(b)
}

/// Sole character of the two-byte builtin variables `$$ $? $^ $_`.
#[inline]
pub(crate) fn is_special_variable(b: u8) -> bool {
    matches!(b, b'$' | b'?' | b'^' | b'_')
}

/// Identifier characters plus `-`: the alphabet of command names,
/// parameters, and labels (`Get-Item`, `-Recurse`).
#[inline]
pub(crate) fn is_psh_identifier_char(b: u8) -> bool {
    is_identifier_char(b) || b == b'-'
}

/// A `[` after one of these reads as array indexing, not an attribute.
#[inline]
pub(crate) fn prefer_array_index(b: u8) -> bool {
    b == b')' || b == b']' || is_identifier_char(b)
}

/// Number token opener, judged over (previous, current, next) bytes so a
/// digit glued to an identifier does not restart a number.
#[inline]
pub(crate) fn is_number_start(prev: u8, ch: u8, next: u8) -> bool {
    (ch.is_ascii_digit() || (ch == b'.' && next.is_ascii_digit())) && !is_identifier_char(prev)
}

/// Number token continuation: identifier characters cover hex, binary,
/// exponent and type-suffix letters; `+`/`-` continue only right after an
/// exponent marker; `.` continues unless it starts a `..` range.
#[inline]
pub(crate) fn is_number_continue(prev: u8, ch: u8, next: u8) -> bool {
    is_identifier_char(ch)
        || (ch == b'.' && next != b'.')
        || ((ch == b'+' || ch == b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P'))
}

/// Printable, non-space ASCII: anything that can open an operator token.
#[inline]
pub(crate) fn is_graphic(b: u8) -> bool {
    (0x21..=0x7E).contains(&b)
}

/// Space, tab, or any vertical whitespace byte.
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    b == b' ' || (0x09..=0x0D).contains(&b)
}
