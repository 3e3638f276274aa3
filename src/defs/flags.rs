use bitflags::bitflags;

bitflags! {
    /// Rendering hints carried by every thing type.
    ///
    /// The values follow the editor's game-definition files.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ThingFlags: u8 {
        // Hangs from the ceiling instead of standing on the floor.
        const CEIL   = 0x01;
        // Full-bright: never darkened by sector light or distance.
        const LIT    = 0x02;
        // Partially invisible (spectre): darkens whatever is behind it.
        const INVIS  = 0x04;
    }
}
