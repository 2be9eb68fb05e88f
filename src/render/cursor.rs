//! Cursor arithmetic for wrapped inline content.
//!
//! Pure functions translating between logical text positions and
//! physical terminal rows/columns. Every redraw-in-place path computes
//! its erase distance and final cursor position through these, so the
//! arithmetic here and the terminal's wrapping behavior must agree.
//!
//! Movement is asymmetric on purpose: sequences only ever move the
//! cursor *up*. Reaching a row below the current one is done by
//! writing newlines, since moving down into rows the terminal has not
//! yet scrolled into existence is undefined.

use crate::text::string_width;

/// Physical rows occupied by content `total_width` cells wide.
///
/// At least 1 even for empty content; exactly 1 when the column count
/// is unknown (`columns == 0`).
pub fn visual_rows(total_width: usize, columns: usize) -> usize {
    if columns == 0 {
        return 1;
    }
    total_width.div_ceil(columns).max(1)
}

/// Physical (row, col) of the cursor within a wrapped prompt line.
///
/// `before_width` is the rendered width of the text left of the
/// cursor. With an unknown column count the content cannot wrap and
/// the linear offset is the column.
///
/// At an exact multiple of the column count the terminal defers the
/// wrap: the cursor holds on the last cell of the current row, and the
/// row below does not exist until something is written into it. The
/// position reported here stays on that last cell, so callers never
/// address a row the terminal has not created.
pub fn target_position(prompt_width: usize, before_width: usize, columns: usize) -> (usize, usize) {
    let linear = prompt_width + before_width;
    if columns == 0 {
        return (0, linear);
    }
    if linear > 0 && linear % columns == 0 {
        return ((linear - 1) / columns, columns - 1);
    }
    (linear / columns, linear % columns)
}

/// Minimal escape sequence moving from `(current_row, current_col)` to
/// `(target_row, target_col)` within already-drawn rows.
///
/// Emits up-movement only when the target is above, then a carriage
/// return, then right-movement. Never emits down-movement.
pub fn move_to(
    current_row: usize,
    current_col: usize,
    target_row: usize,
    target_col: usize,
) -> String {
    let mut seq = String::new();
    if target_row < current_row {
        seq.push_str(&format!("\x1b[{}A", current_row - target_row));
    }
    if target_col != current_col || target_row < current_row {
        seq.push('\r');
        if target_col > 0 {
            seq.push_str(&format!("\x1b[{}C", target_col));
        }
    }
    seq
}

/// Total physical rows of a block of logical lines, wrapping each line
/// independently at `columns`.
pub fn block_rows(lines: &[String], columns: usize) -> usize {
    lines
        .iter()
        .map(|line| visual_rows(string_width(line), columns))
        .sum()
}
