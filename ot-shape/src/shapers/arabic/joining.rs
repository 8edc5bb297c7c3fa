//! The Arabic joining state machine: classifies every codepoint into one
//! of six joining classes and walks a 7-state table left to right to
//! decide which presentational form (isol/init/medi/fina/...) each
//! position takes.

use unicode_general_category::GeneralCategory;

use crate::buffer::Buffer;

/// The action assigned to a position: which Arabic forms feature should
/// apply there. `StretchingFixed`/`StretchingRepeating` are not OpenType
/// features; they're how [`super::stretch`] tags glyphs that came out of
/// the `stch` decomposition for later measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    Isol = 0,
    Fina = 1,
    Fin2 = 2,
    Fin3 = 3,
    Medi = 4,
    Med2 = 5,
    Init = 6,
    None = 7,
    StretchingFixed = 8,
    StretchingRepeating = 9,
}

impl Action {
    pub fn is_stch(self) -> bool {
        matches!(self, Action::StretchingFixed | Action::StretchingRepeating)
    }
}

/// The six joining-class columns the state table is indexed by. `T`
/// (transparent) never reaches the table: it's skipped while walking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JoiningType {
    U = 0,
    L = 1,
    R = 2,
    D = 3,
    Alaph = 4,
    DalathRish = 5,
    T,
}

type StateEntry = (Action, Action, u16);

#[rustfmt::skip]
const STATE_TABLE: [[StateEntry; 6]; 7] = [
    // State 0: prev was U, not willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::None, Action::Isol, 1),
        (Action::None, Action::Isol, 2), (Action::None, Action::Isol, 1), (Action::None, Action::Isol, 6),
    ],
    // State 1: prev was R or Isol/Alaph, not willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::None, Action::Isol, 1),
        (Action::None, Action::Isol, 2), (Action::None, Action::Fin2, 5), (Action::None, Action::Isol, 6),
    ],
    // State 2: prev was D/L in Isol form, willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::Init, Action::Fina, 1),
        (Action::Init, Action::Fina, 3), (Action::Init, Action::Fina, 4), (Action::Init, Action::Fina, 6),
    ],
    // State 3: prev was D in Fina form, willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::Medi, Action::Fina, 1),
        (Action::Medi, Action::Fina, 3), (Action::Medi, Action::Fina, 4), (Action::Medi, Action::Fina, 6),
    ],
    // State 4: prev was Fina Alaph, not willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::Med2, Action::Isol, 1),
        (Action::Med2, Action::Isol, 2), (Action::Med2, Action::Fin2, 5), (Action::Med2, Action::Isol, 6),
    ],
    // State 5: prev was Fin2/Fin3 Alaph, not willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::Isol, Action::Isol, 1),
        (Action::Isol, Action::Isol, 2), (Action::Isol, Action::Fin2, 5), (Action::Isol, Action::Isol, 6),
    ],
    // State 6: prev was Dalath/Rish, not willing to join.
    [
        (Action::None, Action::None, 0), (Action::None, Action::Isol, 2), (Action::None, Action::Isol, 1),
        (Action::None, Action::Isol, 2), (Action::None, Action::Fin3, 5), (Action::None, Action::Isol, 6),
    ],
];

/// Syriac Alaph (U+0710) and the Dalath/Rish family route through their own
/// state-table columns rather than plain R, since they affect the ligature
/// a following Alaph forms; the Unicode joining-type data only says "R" for
/// all of these; the letter identity has to disambiguate.
const SYRIAC_DALATH_RISH: &[u32] = &[0x0715, 0x0716, 0x0717, 0x0718, 0x0719, 0x0728, 0x0729, 0x072A, 0x072B, 0x072C];

fn joining_type_of(ch: char, gc: GeneralCategory) -> JoiningType {
    if ch as u32 == 0x0710 {
        return JoiningType::Alaph;
    }
    if SYRIAC_DALATH_RISH.contains(&(ch as u32)) {
        return JoiningType::DalathRish;
    }
    match unicode_joining_type::get_joining_type(ch) {
        unicode_joining_type::JoiningType::NonJoining => {
            // The Unicode joining-type data reports plain non-joining for
            // codepoints with no entry at all, so marks/format characters
            // fall back to transparent rather than blocking a join.
            if matches!(gc, GeneralCategory::NonspacingMark | GeneralCategory::EnclosingMark | GeneralCategory::Format) {
                JoiningType::T
            } else {
                JoiningType::U
            }
        }
        unicode_joining_type::JoiningType::LeftJoining => JoiningType::L,
        unicode_joining_type::JoiningType::RightJoining => JoiningType::R,
        unicode_joining_type::JoiningType::DualJoining => JoiningType::D,
        unicode_joining_type::JoiningType::JoinCausing => JoiningType::D,
        unicode_joining_type::JoiningType::Transparent => JoiningType::T,
    }
}

/// Runs the joining state machine over the whole buffer, seeding state
/// from pre-context and feeding post-context to resolve the final
/// position's action, then stamps `complex_aux` with the resulting
/// [`Action`] (as its raw discriminant) for each position.
pub fn arabic_joining(buffer: &mut Buffer) {
    let mut prev: Option<usize> = None;
    let mut state = 0usize;

    for &c in &buffer.pre_context {
        let this_type = joining_type_of(c, unicode_general_category::get_general_category(c));
        if this_type == JoiningType::T {
            continue;
        }
        state = STATE_TABLE[state][this_type as usize].2 as usize;
        break;
    }

    for i in 0..buffer.len() {
        let ch = char::from_u32(buffer.info[i].codepoint).unwrap_or('\u{FFFD}');
        let this_type = joining_type_of(ch, buffer.info[i].general_category);
        if this_type == JoiningType::T {
            set_action(buffer, i, Action::None);
            if let Some(p) = prev {
                buffer.merge_clusters(p, i);
            }
            continue;
        }

        let entry = STATE_TABLE[state][this_type as usize];
        if entry.0 != Action::None {
            if let Some(p) = prev {
                set_action(buffer, p, entry.0);
            }
        }
        set_action(buffer, i, entry.1);

        prev = Some(i);
        state = entry.2 as usize;
    }

    for &c in &buffer.post_context {
        let this_type = joining_type_of(c, unicode_general_category::get_general_category(c));
        if this_type == JoiningType::T {
            continue;
        }
        let entry = STATE_TABLE[state][this_type as usize];
        if entry.0 != Action::None {
            if let Some(p) = prev {
                set_action(buffer, p, entry.0);
            }
        }
        break;
    }
}

fn set_action(buffer: &mut Buffer, index: usize, action: Action) {
    buffer.info[index].complex_aux = crate::buffer::ComplexAux(action as u32);
}

pub fn action_at(buffer: &Buffer, index: usize) -> Action {
    match buffer.info[index].complex_aux.0 {
        0 => Action::Isol,
        1 => Action::Fina,
        2 => Action::Fin2,
        3 => Action::Fin3,
        4 => Action::Medi,
        5 => Action::Med2,
        6 => Action::Init,
        8 => Action::StretchingFixed,
        9 => Action::StretchingRepeating,
        _ => Action::None,
    }
}

/// Copies the joining action of each preceding base onto a Mongolian
/// variation selector (U+180B..U+180D, U+180F) that follows it, since
/// those codepoints themselves carry no joining type of their own.
pub fn mongolian_variation_selectors(buffer: &mut Buffer) {
    for i in 1..buffer.len() {
        let cp = buffer.info[i].codepoint;
        if matches!(cp, 0x180B..=0x180D | 0x180F) {
            let prev_action = buffer.info[i - 1].complex_aux;
            buffer.info[i].complex_aux = prev_action;
        }
    }
}

const MODIFIER_COMBINING_MARKS: &[u32] = &[
    0x0654, 0x0655, 0x0658, 0x06DC, 0x06E3, 0x06E7, 0x06E8, 0x08D3, 0x08F3,
];

const CCC22: u8 = 22;
const CCC26: u8 = 26;

/// Rotates runs of [`MODIFIER_COMBINING_MARKS`] at combining class 220 or
/// 230 to immediately follow their base, then renumbers them to 22/26 so
/// the sequence stays non-decreasing (matching the convention the
/// normalizer's mark-sequence ordering relies on).
pub fn reorder_marks(mut start: usize, end: usize, buffer: &mut Buffer) {
    let mut i = start;
    for &cc in &[220u8, 230] {
        while i < end && buffer.info[i].combining_class < cc {
            i += 1;
        }
        if i == end {
            break;
        }
        if buffer.info[i].combining_class > cc {
            continue;
        }

        let mut j = i;
        while j < end
            && buffer.info[j].combining_class == cc
            && MODIFIER_COMBINING_MARKS.contains(&buffer.info[j].codepoint)
        {
            j += 1;
        }
        if i == j {
            continue;
        }

        buffer.merge_clusters(start, j.saturating_sub(1));

        let moved: Vec<_> = buffer.info[i..j].to_vec();
        let moved_pos: Vec<_> = buffer.pos[i..j].to_vec();
        buffer.info.copy_within(start..i, start + (j - i));
        buffer.pos.copy_within(start..i, start + (j - i));
        buffer.info[start..start + (j - i)].clone_from_slice(&moved);
        buffer.pos[start..start + (j - i)].clone_from_slice(&moved_pos);

        let new_start = start + (j - i);
        let new_cc = if cc == 220 { CCC22 } else { CCC26 };
        for g in &mut buffer.info[start..new_start] {
            g.combining_class = new_cc;
        }

        start = new_start;
        i = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, Direction};

    #[test]
    fn beh_yeh_teh_join_as_init_medi_fina() {
        // beh, yeh, teh: all dual-joining, so the sequence should come out
        // init/medi/fina.
        let mut buffer = Buffer::from_codepoints(&[0x0628, 0x064A, 0x062A], Direction::RightToLeft);
        arabic_joining(&mut buffer);
        assert_eq!(action_at(&buffer, 0), Action::Init);
        assert_eq!(action_at(&buffer, 1), Action::Medi);
        assert_eq!(action_at(&buffer, 2), Action::Fina);
    }

    #[test]
    fn fatha_is_transparent_and_does_not_break_joining() {
        // beh, fatha, teh: fatha (a combining mark) is joining-type T, so
        // joining should pass through it as if it weren't there.
        let mut buffer = Buffer::from_codepoints(&[0x0628, 0x064E, 0x062A], Direction::RightToLeft);
        arabic_joining(&mut buffer);
        assert_eq!(action_at(&buffer, 0), Action::Init);
        assert_eq!(action_at(&buffer, 1), Action::None);
        assert_eq!(action_at(&buffer, 2), Action::Fina);
        assert_eq!(buffer.info[0].cluster, buffer.info[1].cluster);
    }
}
