use bitflags::bitflags;
use glam::Vec2;

pub type LinedefId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type ThingId = u16;

/// Read-only geometry queries the renderer needs from the map owner.
///
/// The editor keeps its own storage; the renderer only ever borrows slices
/// and asks which sector a thing stands in.
pub trait MapGeometry {
    fn vertices(&self) -> &[Vertex];
    fn linedefs(&self) -> &[Linedef];
    fn sidedefs(&self) -> &[Sidedef];
    fn sectors(&self) -> &[Sector];
    fn things(&self) -> &[Thing];

    /// Sector containing `thing`, `None` when it sits in the void.
    fn thing_sector(&self, thing: ThingId) -> Option<SectorId>;
}

/// Runtime snapshot of one map (immutable while rendering).
#[derive(Debug, Default)]
pub struct Level {
    pub name: String,
    pub things: Vec<Thing>,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub vertices: Vec<Vertex>,
    pub sectors: Vec<Sector>,
    /// lookup: thing → sector (filled by `Level::locate_things`)
    pub thing_sectors: Vec<Option<SectorId>>,
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Debug)]
pub struct Thing {
    pub pos: Vec2,
    /// Height above the floor (or below the ceiling for hanging things).
    pub z: i32,
    pub type_id: u16,
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0008;
        const LOWER_UNPEGGED  = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const NOT_ON_MAP      = 0x0080;
        const ALREADY_ON_MAP  = 0x0100;
    }
}

/// Which side of a linedef the viewer is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Right,
    Left,
}

#[derive(Clone, Debug)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub right_sidedef: Option<SidedefId>,
    pub left_sidedef: Option<SidedefId>,
}

impl Linedef {
    #[inline]
    pub fn sidedef(&self, side: Side) -> Option<SidedefId> {
        match side {
            Side::Right => self.right_sidedef,
            Side::Left => self.left_sidedef,
        }
    }
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug)]
pub struct Sidedef {
    pub x_off: i32,
    pub y_off: i32,
    pub upper: String,
    pub lower: String,
    pub middle: String,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub pos: Vec2,
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub floor_h: i32,
    pub ceil_h: i32,
    pub floor_tex: String,
    pub ceil_tex: String,
    /// 0 (pitch black) ..= 255 (full bright)
    pub light: i32,
}

/// Which side of the infinite line `a → b` the point `p` lies on:
/// `+1` right, `-1` left, `0` on the line.
pub fn point_on_line_side(p: Vec2, a: Vec2, b: Vec2) -> i32 {
    let d = b - a;
    let r = p - a;
    let tmp = r.x * d.y - r.y * d.x;
    if tmp < 0.0 {
        -1
    } else if tmp > 0.0 {
        1
    } else {
        0
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Sector under the map point `p`.
    ///
    /// Casts a ray towards +X, takes the closest linedef it crosses and
    /// returns the sector of whichever side of that line faces `p`.
    pub fn sector_at(&self, p: Vec2) -> Option<SectorId> {
        let mut best: Option<(f32, &Linedef)> = None;

        for ld in &self.linedefs {
            let a = self.vertices.get(ld.v1 as usize)?.pos;
            let b = self.vertices.get(ld.v2 as usize)?.pos;

            // horizontal lines never cross a horizontal ray
            if a.y == b.y {
                continue;
            }
            let (lo, hi) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
            if p.y < lo || p.y >= hi {
                continue;
            }

            let t = (p.y - a.y) / (b.y - a.y);
            let dx = a.x + (b.x - a.x) * t - p.x;
            if dx < 0.0 {
                continue;
            }
            if best.is_none_or(|(d, _)| dx < d) {
                best = Some((dx, ld));
            }
        }

        let (_, ld) = best?;
        let a = self.vertices[ld.v1 as usize].pos;
        let b = self.vertices[ld.v2 as usize].pos;
        let side = if point_on_line_side(p, a, b) < 0 {
            Side::Left
        } else {
            Side::Right
        };
        ld.sidedef(side)
            .and_then(|sd| self.sidedefs.get(sd as usize))
            .map(|sd| sd.sector)
    }

    /// Refresh the thing → sector lookup after things or sectors moved.
    pub fn locate_things(&mut self) {
        self.thing_sectors = self.things.iter().map(|t| self.sector_at(t.pos)).collect();
    }
}

impl MapGeometry for Level {
    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn linedefs(&self) -> &[Linedef] {
        &self.linedefs
    }

    fn sidedefs(&self) -> &[Sidedef] {
        &self.sidedefs
    }

    fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    fn things(&self) -> &[Thing] {
        &self.things
    }

    fn thing_sector(&self, thing: ThingId) -> Option<SectorId> {
        self.thing_sectors.get(thing as usize).copied().flatten()
    }
}
