//! Restartable scan context with one-byte lookahead.
//!
//! The context walks a byte range of a [`StyledDocument`] and commits
//! style runs into the document's style buffer. It mirrors the classic
//! editor-lexer loop shape:
//!
//! ```text
//! while sc.more() {
//!     match sc.state() { /* per-state transitions */ }
//!     /* default-state dispatch, bookkeeping */
//!     sc.forward();
//! }
//! sc.complete();
//! ```
//!
//! A state arm that needs to re-evaluate the current byte under a new
//! state calls `set_state` and `continue`s the loop instead of falling
//! through to `forward()`. The stack-of-return-styles pattern used for
//! escape characters and nested sub-expressions stays non-recursive.
//!
//! # Restartability
//!
//! Constructing the context at a line boundary with the style that was in
//! effect there reproduces a full scan's output from that point on. The
//! context itself carries no cross-call state; everything persistent
//! lives in the document's per-line integers.

use crate::StyledDocument;

/// Forward scanner over a document range, generic over the engine's style
/// code. The document stores styles as raw bytes; `S` converts on commit.
pub struct ScanContext<'a, S> {
    doc: &'a mut StyledDocument,
    /// Style of the run being accumulated (not yet committed).
    state: S,
    /// Start of the pending run.
    start_seg: u32,
    /// Current scan position.
    current_pos: u32,
    /// Exclusive end of the scan range.
    end_pos: u32,
    /// Line containing `current_pos`.
    current_line: u32,
    /// Start of the line after `current_line` (document length on the
    /// last line).
    line_start_next: u32,
    /// Byte before the current one; 0 at the document start.
    pub ch_prev: u8,
    /// Current byte; 0 past the end of the document.
    pub ch: u8,
    /// Next byte; 0 past the end of the document.
    pub ch_next: u8,
    /// `true` when `current_pos` is the first byte of its line.
    pub at_line_start: bool,
}

impl<'a, S: Copy + Into<u8>> ScanContext<'a, S> {
    /// Begin a scan of `start..start + length` with `init_style` active.
    ///
    /// `init_style` is the style in effect at `start` from a prior scan
    /// (the style of the preceding byte), which is what makes resuming
    /// inside a multi-line construct work.
    pub fn new(doc: &'a mut StyledDocument, start: u32, length: u32, init_style: S) -> Self {
        let end_pos = start.saturating_add(length).min(doc.len());
        debug_assert!(start <= end_pos, "scan start {start} past range end");
        let current_line = doc.line_of(start);
        Self {
            state: init_style,
            start_seg: start,
            current_pos: start,
            end_pos,
            line_start_next: doc.line_start(current_line + 1),
            ch_prev: if start == 0 { 0 } else { doc.byte_at(start - 1) },
            ch: doc.byte_at(start),
            ch_next: doc.byte_at(start + 1),
            at_line_start: doc.line_start(current_line) == start,
            current_line,
            doc,
        }
    }

    /// `true` while the scan position is inside the range.
    #[inline]
    pub fn more(&self) -> bool {
        self.current_pos < self.end_pos
    }

    /// Style of the pending run.
    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    /// Current byte offset.
    #[inline]
    pub fn current_pos(&self) -> u32 {
        self.current_pos
    }

    /// Line containing the current byte.
    #[inline]
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    /// `true` when the current byte is the last byte of its line (the
    /// `\n`, or the final byte of a document without one).
    #[inline]
    pub fn at_line_end(&self) -> bool {
        self.current_pos + 1 >= self.line_start_next
    }

    /// `true` when the current and next bytes equal `a`, `b`.
    #[inline]
    pub fn match2(&self, a: u8, b: u8) -> bool {
        self.ch == a && self.ch_next == b
    }

    /// Advance one byte, shifting the lookahead window and the line
    /// bookkeeping. Past the range end this only collapses the window.
    pub fn forward(&mut self) {
        if self.current_pos < self.end_pos {
            self.current_pos += 1;
            self.ch_prev = self.ch;
            self.ch = self.ch_next;
            self.ch_next = self.doc.byte_at(self.current_pos + 1);
            if self.current_pos >= self.line_start_next {
                self.current_line += 1;
                self.line_start_next = self.doc.line_start(self.current_line + 1);
                self.at_line_start = true;
            } else {
                self.at_line_start = false;
            }
        } else {
            self.ch_prev = self.ch;
            self.ch = 0;
            self.ch_next = 0;
            self.at_line_start = false;
        }
    }

    /// Commit the pending run at its current style, then open a new run
    /// at the current position with style `state`.
    pub fn set_state(&mut self, state: S) {
        self.doc
            .fill_styles(self.start_seg, self.current_pos, self.state.into());
        self.start_seg = self.current_pos;
        self.state = state;
    }

    /// `forward()` then `set_state(state)`: the current byte closes the
    /// pending run and the new run starts after it.
    pub fn forward_set_state(&mut self, state: S) {
        self.forward();
        self.set_state(state);
    }

    /// Retag the pending run without committing it. Used when a token's
    /// final classification is only known at its end (keyword lookup).
    #[inline]
    pub fn change_state(&mut self, state: S) {
        self.state = state;
    }

    /// Commit the final pending run. Call once after the scan loop.
    pub fn complete(self) {
        self.doc
            .fill_styles(self.start_seg, self.current_pos, self.state.into());
    }

    /// Length of the pending run.
    #[inline]
    pub fn length_current(&self) -> u32 {
        self.current_pos - self.start_seg
    }

    /// Copy the pending run, ASCII-lowercased, into `buf`.
    ///
    /// Runs longer than `buf` are truncated; a truncated token simply
    /// fails any exact keyword match, which is the accepted behavior for
    /// pathological input.
    pub fn current_lowered<'b>(&self, buf: &'b mut [u8]) -> &'b [u8] {
        let len = (self.length_current() as usize).min(buf.len());
        for (i, slot) in buf.iter_mut().enumerate().take(len) {
            #[allow(clippy::cast_possible_truncation, reason = "i < len <= run length")]
            let pos = self.start_seg + i as u32;
            *slot = self.doc.byte_at(pos).to_ascii_lowercase();
        }
        &buf[..len]
    }

    /// First byte from the current position to the end of the line that
    /// is not a space or tab, or 0 if the rest of the line is blank.
    pub fn line_next_char(&self) -> u8 {
        let mut pos = self.current_pos;
        while pos < self.line_start_next {
            match self.doc.byte_at(pos) {
                b' ' | b'\t' => pos += 1,
                b'\r' | b'\n' => return 0,
                b => return b,
            }
        }
        0
    }

    /// Opaque state saved for `line`, 0 if never set.
    #[inline]
    pub fn line_state(&self, line: u32) -> u32 {
        self.doc.line_state(line)
    }

    /// Save the opaque state for `line`.
    #[inline]
    pub fn set_line_state(&mut self, line: u32, state: u32) {
        self.doc.set_line_state(line, state);
    }
}
