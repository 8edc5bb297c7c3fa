//! The `stch` (stretching glyph) feature: a justification-time pass that
//! tiles a repeating middle glyph to fill available width, used by some
//! Arabic fonts instead of variable-width kashida insertion.

use crate::buffer::Buffer;
use crate::shapers::arabic::joining::{action_at, Action};

/// After `stch` substitution has turned one glyph into a multi-glyph
/// sequence, tags each output glyph `StretchingFixed` (the unrepeated ends)
/// or `StretchingRepeating` (the tile in between) based on the ligature
/// component parity the substitution left behind.
pub fn record_stch(buffer: &mut Buffer) {
    for g in &mut buffer.info {
        if g.multiplied {
            let action = if g.lig_comp % 2 == 0 {
                Action::StretchingRepeating
            } else {
                Action::StretchingFixed
            };
            g.complex_aux = crate::buffer::ComplexAux(action as u32);
        }
    }
}

/// Measures each maximal run of stretch-tagged glyphs against the width
/// available to the whole run (`desired_width`, in the same units as glyph
/// advances) and duplicates the repeating tile enough times to fill it,
/// distributing the unavoidable leftover evenly across the copies.
///
/// `desired_width` stands in for the justification target a layout engine
/// would otherwise supply; callers driving this without an external layout
/// budget can pass the run's own natural width to make this a no-op.
pub fn apply_stch(buffer: &mut Buffer, desired_width: i64) {
    let mut i = 0;
    while i < buffer.len() {
        if !action_at(buffer, i).is_stch() {
            i += 1;
            continue;
        }
        let start = i;
        while i < buffer.len() && action_at(buffer, i).is_stch() {
            i += 1;
        }
        let end = i;
        stretch_run(buffer, start, end, desired_width);
        // The run just grew in place; resume scanning after it.
        i = end;
    }
}

fn stretch_run(buffer: &mut Buffer, start: usize, end: usize, desired_width: i64) {
    let w_total: i64 = buffer.pos[start..end].iter().map(|p| p.x_advance as i64).sum();
    let w_fixed: i64 = (start..end)
        .filter(|&j| action_at(buffer, j) == Action::StretchingFixed)
        .map(|j| buffer.pos[j].x_advance as i64)
        .sum();
    let w_repeating: i64 = w_total - w_fixed;

    let n_repeating = (start..end).filter(|&j| action_at(buffer, j) == Action::StretchingRepeating).count();
    if n_repeating == 0 || w_repeating <= 0 {
        return;
    }

    let w_remaining = desired_width - w_fixed;
    if w_remaining <= w_repeating {
        // Nothing to add: shrink the single repeating tile set to fit by
        // leaving it as-is (no narrower substitute glyph exists).
        return;
    }

    let n_copies = w_remaining / w_repeating - 1;
    if n_copies <= 0 {
        return;
    }
    let n_copies = n_copies as usize;

    let excess = (n_copies as i64 + 1) * w_repeating - w_remaining;
    let extra_repeat_overlap = if excess > 0 && n_copies * n_repeating > 0 {
        excess / (n_copies as i64 * n_repeating as i64)
    } else {
        0
    };

    // Walk backward so each inserted clone's index doesn't shift the
    // positions of repeating glyphs still to be processed.
    let repeating_indices: Vec<usize> =
        (start..end).filter(|&j| action_at(buffer, j) == Action::StretchingRepeating).collect();
    for &j in repeating_indices.iter().rev() {
        buffer.replicate(j, n_copies);
        for k in j + 1..=j + n_copies {
            buffer.pos[k].x_advance -= extra_repeat_overlap as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, ComplexAux, Direction, GlyphPosition};

    fn make_run(widths: &[i32], actions: &[Action]) -> Buffer {
        let mut buffer = Buffer::from_codepoints(&vec![0x0640u32; widths.len()], Direction::RightToLeft);
        for (i, (&w, &a)) in widths.iter().zip(actions).enumerate() {
            buffer.pos[i] = GlyphPosition { x_advance: w, ..Default::default() };
            buffer.info[i].complex_aux = ComplexAux(a as u32);
        }
        buffer
    }

    #[test]
    fn exact_fit_adds_no_extra_overlap() {
        // fixed(10) + repeating(10) + fixed(10), desired width exactly
        // 2x the repeating tile past the fixed ends: 10+20+10=40.
        let mut buffer = make_run(
            &[10, 10, 10],
            &[Action::StretchingFixed, Action::StretchingRepeating, Action::StretchingFixed],
        );
        apply_stch(&mut buffer, 40);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn insufficient_width_leaves_run_untouched() {
        let mut buffer = make_run(
            &[10, 10, 10],
            &[Action::StretchingFixed, Action::StretchingRepeating, Action::StretchingFixed],
        );
        apply_stch(&mut buffer, 25);
        assert_eq!(buffer.len(), 3);
    }
}
