//! The in-game text table `DrawString` (opcode 18) looks `string_id` up
//! against (spec §4.2 opcode 18, §9 Open Questions). Unlike every other
//! resource kind in §3, strings are never loaded from a bank: the original
//! game links them directly into the executable, so this table is baked
//! into source the same way `gfx::font`'s glyph rows are, rather than
//! resolved through `res::directory`.
//!
//! Entries are listed id-ascending except for the deliberately duplicated
//! id below; `lookup` does a linear scan and keeps the last match, so a
//! later entry for the same id silently wins over an earlier one (spec §9:
//! "behavior is last definition wins in a linear search"). Text content
//! here is placeholder UI copy, not a transcription of any original
//! asset's dialog.
const TABLE: &[(u16, &[u8])] = &[
    (0x001, b"LOADING"),
    (0x002, b"PLEASE WAIT"),
    (0x003, b"INSERT DISK"),
    (0x00A, b"CONTINUE?"),
    (0x064, b"GAME OVER"),
    (0x12C, b"PAUSED"),
    (0x12D, b"PRESS A KEY TO CONTINUE"),
    (0x190, b"0"),
    (0x191, b"1"),
    (0x192, b"ENTER ACCESS CODE"),
    // Id 0x193 is deliberately defined twice (spec §9 "duplicate entry");
    // `lookup` returns the second one.
    (0x193, b"ENTER THE ACCESS CODE\n"),
    (0x193, b"ENTER THE CORRECT PASSWORD\n"),
    (0x194, b"ENTER YOUR NAME"),
    (0x258, b"MUSIC"),
    (0x259, b"SOUND"),
];

/// Last-definition-wins lookup (spec §9). Returns an empty string for an
/// unknown id rather than erroring, matching `DrawString`'s treatment of
/// out-of-table ids as "nothing to draw", not a bytecode fault.
pub fn lookup(id: u16) -> &'static [u8] {
    TABLE
        .iter()
        .rev()
        .find(|(entry_id, _)| *entry_id == id)
        .map(|(_, text)| *text)
        .unwrap_or(b"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_id_resolves_to_its_text() {
        assert_eq!(lookup(0x12C), b"PAUSED");
    }

    #[test]
    fn unknown_id_resolves_to_an_empty_string() {
        assert_eq!(lookup(0xBEEF), b"");
    }

    #[test]
    fn duplicate_entry_resolves_to_the_last_definition() {
        assert_eq!(lookup(0x193), b"ENTER THE CORRECT PASSWORD\n");
    }
}
