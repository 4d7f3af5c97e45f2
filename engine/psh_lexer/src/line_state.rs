//! Per-line state codec: nesting stack + line-type flag in one `u32`.
//!
//! The host stores exactly one integer per line and treats it as opaque;
//! this module is the only place that knows the layout:
//!
//! ```text
//! bit  0      line is entirely a line comment (folder contiguity input)
//! bits 1..8   reserved, always 0
//! bits 8..32  nesting stack, 3 bits per entry, bottom entry lowest
//! ```
//!
//! Each stack entry is the style to resume when an interpolated
//! sub-expression closes. Only three styles can ever be pushed (`Default`,
//! `StringDq`, `HereStringDq`), encoded 1..=3 so that code 0 terminates
//! the packed sequence and the depth never needs its own field.
//!
//! Eight 3-bit groups fill the 24 available bits. Interpolations nested
//! deeper than 8 levels persist only their bottom-most 8 entries; a rescan
//! resuming past such a line re-enters the outermost contexts correctly
//! and degrades to default scanning for the rest, which is the accepted
//! approximation for pathological input.

use smallvec::SmallVec;

use crate::styles::Style;

/// Deepest nesting that survives a line boundary.
pub(crate) const MAX_NESTING: usize = 8;

const LINE_COMMENT_FLAG: u32 = 1;
const NESTED_SHIFT: u32 = 8;
const ENTRY_BITS: u32 = 3;
const ENTRY_MASK: u32 = (1 << ENTRY_BITS) - 1;

/// Stack of styles to resume as nested sub-expressions close.
/// Inline up to the persistable depth; deeper stacks spill but still scan
/// correctly within their own line.
pub(crate) type NestedStack = SmallVec<[Style; MAX_NESTING]>;

/// Pop the resume style, or `Default` when not inside any construct.
#[inline]
pub(crate) fn take_and_pop(stack: &mut NestedStack) -> Style {
    stack.pop().unwrap_or(Style::Default)
}

fn encode(style: Style) -> u32 {
    match style {
        Style::StringDq => 2,
        Style::HereStringDq => 3,
        // Only the three interpolation hosts are ever pushed.
        _ => 1,
    }
}

fn decode(code: u32) -> Style {
    match code {
        2 => Style::StringDq,
        3 => Style::HereStringDq,
        _ => Style::Default,
    }
}

/// Pack the line-comment flag and nesting stack into the per-line state.
pub(crate) fn pack_line_state(line_comment: bool, stack: &NestedStack) -> u32 {
    let mut packed = 0u32;
    for (slot, &style) in stack.iter().take(MAX_NESTING).enumerate() {
        #[allow(clippy::cast_possible_truncation, reason = "slot < MAX_NESTING")]
        let shift = slot as u32 * ENTRY_BITS;
        packed |= encode(style) << shift;
    }
    (packed << NESTED_SHIFT) | u32::from(line_comment)
}

/// Rebuild the nesting stack saved in `state`, pushing bottom-first onto
/// `stack`. A state with no packed entries pushes nothing.
pub(crate) fn unpack_nested(state: u32, stack: &mut NestedStack) {
    let mut packed = state >> NESTED_SHIFT;
    while packed != 0 {
        stack.push(decode(packed & ENTRY_MASK));
        packed >>= ENTRY_BITS;
    }
}

/// Line-comment flag of a packed state. Also read by the folder.
#[inline]
pub(crate) fn line_comment_flag(state: u32) -> bool {
    state & LINE_COMMENT_FLAG != 0
}
