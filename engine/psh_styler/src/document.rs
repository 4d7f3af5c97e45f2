//! Document storage: text, per-byte styles, per-line state and fold levels.
//!
//! The line index is built once at construction with a `memchr` sweep over
//! the text. Lines are byte ranges; line *n* starts at `line_starts[n]` and
//! runs to the start of line *n + 1*. A document always has at least one
//! line, and a trailing `\n` opens a final empty line, matching editor
//! line-counting conventions.
//!
//! Per-line state and fold-level cells are opaque `u32`s: only the language
//! engine defines their bit layout. Reading state for an out-of-range line
//! returns 0, which doubles as the "no saved context" value when a scan
//! resumes at the top of the document.

/// Source text plus the per-byte and per-line side tables a highlighter
/// produces and consumes.
#[derive(Clone, Debug)]
pub struct StyledDocument {
    /// Raw source bytes.
    text: Box<[u8]>,
    /// Byte offset of the start of each line. `line_starts[0] == 0`.
    line_starts: Vec<u32>,
    /// One style byte per source byte, 0 until a scan commits a run.
    styles: Vec<u8>,
    /// Opaque per-line scanner state, bit layout owned by the engine.
    line_states: Vec<u32>,
    /// Opaque per-line fold cell, bit layout owned by the engine.
    fold_levels: Vec<u32>,
}

impl StyledDocument {
    /// Build a document and its line index from source text.
    ///
    /// Sources larger than `u32::MAX` bytes are not supported; offsets are
    /// 32-bit throughout, like the per-line state they get packed into.
    pub fn new(source: &str) -> Self {
        let text: Box<[u8]> = source.as_bytes().into();
        debug_assert!(u32::try_from(text.len()).is_ok(), "source exceeds 4 GiB");

        let mut line_starts = Vec::with_capacity(16);
        line_starts.push(0u32);
        for pos in memchr::memchr_iter(b'\n', &text) {
            #[allow(clippy::cast_possible_truncation, reason = "len checked above")]
            line_starts.push(pos as u32 + 1);
        }

        let line_count = line_starts.len();
        Self {
            styles: vec![0; text.len()],
            line_states: vec![0; line_count],
            fold_levels: vec![0; line_count],
            text,
            line_starts,
        }
    }

    /// Length of the source in bytes.
    #[inline]
    #[allow(clippy::cast_possible_truncation, reason = "len checked at construction")]
    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    /// Returns `true` if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines. Always at least 1.
    #[inline]
    #[allow(clippy::cast_possible_truncation, reason = "bounded by len")]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Byte at `pos`, or 0 at and past the end of the document.
    ///
    /// The 0 fill means lookahead predicates never match past the end,
    /// which is how unterminated constructs run out quietly.
    #[inline]
    pub fn byte_at(&self, pos: u32) -> u8 {
        self.text.get(pos as usize).copied().unwrap_or(0)
    }

    /// Style byte at `pos`, or 0 out of range.
    #[inline]
    pub fn style_at(&self, pos: u32) -> u8 {
        self.styles.get(pos as usize).copied().unwrap_or(0)
    }

    /// The whole style buffer, one byte per source byte.
    pub fn styles(&self) -> &[u8] {
        &self.styles
    }

    /// Line containing byte offset `pos`. Offsets at or past the end map
    /// to the last line.
    #[inline]
    #[allow(clippy::cast_possible_truncation, reason = "bounded by line_count")]
    pub fn line_of(&self, pos: u32) -> u32 {
        self.line_starts.partition_point(|&start| start <= pos) as u32 - 1
    }

    /// Byte offset of the start of `line`. Lines past the last return the
    /// document length, so `line_start(n + 1)` is always a valid exclusive
    /// end for line `n`.
    #[inline]
    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or_else(|| self.len())
    }

    /// Byte offset of the first end-of-line byte of `line` (the `\r` of a
    /// `\r\n` pair, the lone `\n`, or the document end).
    pub fn line_end(&self, line: u32) -> u32 {
        let start = self.line_start(line);
        let mut end = self.line_start(line + 1);
        while end > start && matches!(self.byte_at(end - 1), b'\n' | b'\r') {
            end -= 1;
        }
        end
    }

    /// First position in `pos..end` holding neither space nor tab.
    pub fn skip_space_tab(&self, mut pos: u32, end: u32) -> u32 {
        while pos < end && matches!(self.byte_at(pos), b' ' | b'\t') {
            pos += 1;
        }
        pos
    }

    /// Opaque scanner state saved for `line`, 0 if never set or out of range.
    #[inline]
    pub fn line_state(&self, line: u32) -> u32 {
        self.line_states.get(line as usize).copied().unwrap_or(0)
    }

    /// Save the opaque scanner state for `line`. Out-of-range lines are
    /// ignored; a scan range may end exactly at the document boundary.
    #[inline]
    pub fn set_line_state(&mut self, line: u32, state: u32) {
        if let Some(slot) = self.line_states.get_mut(line as usize) {
            *slot = state;
        }
    }

    /// Fold cell saved for `line`, 0 if never set or out of range.
    #[inline]
    pub fn fold_level(&self, line: u32) -> u32 {
        self.fold_levels.get(line as usize).copied().unwrap_or(0)
    }

    /// Save the fold cell for `line`.
    #[inline]
    pub fn set_fold_level(&mut self, line: u32, level: u32) {
        if let Some(slot) = self.fold_levels.get_mut(line as usize) {
            *slot = level;
        }
    }

    /// Commit one style byte over `start..end`.
    pub(crate) fn fill_styles(&mut self, start: u32, end: u32, style: u8) {
        debug_assert!(start <= end, "style run start {start} exceeds end {end}");
        if let Some(run) = self.styles.get_mut(start as usize..end as usize) {
            run.fill(style);
        }
    }
}
