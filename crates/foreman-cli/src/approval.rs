use std::io::{BufRead, Write};

/// The approval gate: ask the operator to confirm the pending action.
/// Only an explicit `y` (case-insensitive) approves; anything else,
/// including end-of-input, declines.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write) -> std::io::Result<bool> {
    write!(out, "Do you approve this action? (y/n): ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(line.trim().eq_ignore_ascii_case("y"))
}
