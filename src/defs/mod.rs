pub mod flags;

pub use self::flags::ThingFlags;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Per-type rendering attributes of a map thing.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingInfo {
    pub doomednum: u16,
    pub sprite: &'static str,
    /// Sprite scale relative to the image size.
    pub scale: f32,
    pub flags: ThingFlags,
    pub desc: &'static str,
}

const fn info(
    doomednum: u16,
    sprite: &'static str,
    scale: f32,
    flags: ThingFlags,
    desc: &'static str,
) -> ThingInfo {
    ThingInfo {
        doomednum,
        sprite,
        scale,
        flags,
        desc,
    }
}

const NONE: ThingFlags = ThingFlags::empty();
const CEIL: ThingFlags = ThingFlags::CEIL;
const LIT: ThingFlags = ThingFlags::LIT;

/// very small subset of the DOOM thing types
pub static THING_TYPES: &[ThingInfo] = &[
    info(1, "PLAYA1", 1.0, NONE, "Player 1 start"),
    info(2, "PLAYB1", 1.0, NONE, "Player 2 start"),
    info(11, "PLAYF1", 1.0, NONE, "Deathmatch start"),
    info(2014, "BON1A0", 1.0, NONE, "Health bonus"),
    info(2004, "CLIPA0", 1.0, NONE, "Ammo clip"),
    info(2028, "COLUA0", 1.0, LIT, "Floor lamp"),
    info(34, "CANDA0", 1.0, LIT, "Candle"),
    info(44, "TBLUA0", 1.0, LIT, "Tall blue torch"),
    info(3001, "TROOA1", 1.0, NONE, "Imp"),
    info(3004, "POSSA1", 1.0, NONE, "Former human"),
    info(58, "SARGA1", 1.0, ThingFlags::INVIS, "Spectre"),
    info(49, "GOR1A0", 1.0, CEIL, "Hanging victim, twitching"),
    info(63, "GOR1A0", 1.0, CEIL, "Hanging victim, twitching (non-blocking)"),
    info(50, "GOR2A0", 1.0, CEIL, "Hanging victim, arms out"),
    info(3003, "BOSSA1", 1.0, NONE, "Baron of hell"),
    info(7, "SPIDA1D1", 0.5, NONE, "Spider mastermind (half scale)"),
];

/// Stand-in for types the definitions do not know about.
pub static UNKNOWN_THING: ThingInfo = info(0, "", 1.0, NONE, "Unknown thing");

static BY_DOOMEDNUM: Lazy<HashMap<u16, &'static ThingInfo>> =
    Lazy::new(|| THING_TYPES.iter().map(|info| (info.doomednum, info)).collect());

pub fn by_doomednum(num: u16) -> Option<&'static ThingInfo> {
    BY_DOOMEDNUM.get(&num).copied()
}

/// Lookup that never fails: unknown types get [`UNKNOWN_THING`].
pub fn thing_info(num: u16) -> &'static ThingInfo {
    by_doomednum(num).unwrap_or(&UNKNOWN_THING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_types() {
        assert_eq!(thing_info(3001).sprite, "TROOA1");
        assert!(thing_info(49).flags.contains(ThingFlags::CEIL));
        assert_eq!(thing_info(7).scale, 0.5);
        assert_eq!(thing_info(12345), &UNKNOWN_THING);
        assert_eq!(thing_info(58).desc, "Spectre");
        assert_eq!(thing_info(12345).desc, "Unknown thing");
    }
}
