//! The table of game scenes and the unload/load/reset sequence a scheduled
//! switch performs (spec §4.4, §3 Lifecycle). Analogous to the teacher's
//! per-machine ROM wiring (`JoustSystem::load_rom_set`), generalized from
//! "map ROM files to address ranges" to "load a scene's resource set."

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePart {
    pub id: u16,
    pub palette: u16,
    pub bytecode: u16,
    pub polygon: u16,
    pub animation: Option<u16>,
}

/// The shipped game's scenes, identified by their part id (spec §4.4).
/// Resource ids below are illustrative placeholders for the shape of the
/// table; a concrete game directory supplies the real descriptor indices
/// via its own resource directory.
pub static GAME_PARTS: &[GamePart] = &[
    GamePart {
        id: 0x3E80,
        palette: 0x14,
        bytecode: 0x15,
        polygon: 0x16,
        animation: None,
    },
    GamePart {
        id: 0x3E81,
        palette: 0x17,
        bytecode: 0x18,
        polygon: 0x19,
        animation: Some(0x1A),
    },
    GamePart {
        id: 0x3E82,
        palette: 0x1B,
        bytecode: 0x1C,
        polygon: 0x1D,
        animation: Some(0x1E),
    },
    GamePart {
        id: 0x3E83,
        palette: 0x1F,
        bytecode: 0x20,
        polygon: 0x21,
        animation: Some(0x11),
    },
    GamePart {
        id: 0x3E84,
        palette: 0x22,
        bytecode: 0x23,
        polygon: 0x24,
        animation: Some(0x11),
    },
    GamePart {
        id: 0x3E85,
        palette: 0x25,
        bytecode: 0x26,
        polygon: 0x27,
        animation: None,
    },
    GamePart {
        id: 0x3E86,
        palette: 0x28,
        bytecode: 0x29,
        polygon: 0x2A,
        animation: Some(0x11),
    },
    GamePart {
        id: 0x3E87,
        palette: 0x7D,
        bytecode: 0x7E,
        polygon: 0x7F,
        animation: Some(0x80),
    },
    GamePart {
        id: 0x3E88,
        palette: 0x7D,
        bytecode: 0x7E,
        polygon: 0x7F,
        animation: Some(0x80),
    },
    GamePart {
        id: 0x3E89,
        palette: 0x7D,
        bytecode: 0x7E,
        polygon: 0x7F,
        animation: Some(0x7F),
    },
];

pub fn by_id(id: u16) -> Option<&'static GamePart> {
    GAME_PARTS.iter().find(|part| part.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_part_id_is_unique() {
        let mut ids: Vec<u16> = GAME_PARTS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), GAME_PARTS.len());
    }

    #[test]
    fn by_id_finds_a_known_part_and_rejects_unknown() {
        assert!(by_id(0x3E80).is_some());
        assert!(by_id(0x0000).is_none());
    }
}
