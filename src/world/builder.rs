// Programmatic map construction.
//
// The editor owns the real map tables; this builder exists so the viewer
// and the test-suite can describe small maps in a few lines.

use glam::{Vec2, vec2};
use thiserror::Error;

use super::geometry::{
    Level, Linedef, LinedefFlags, LinedefId, Sector, SectorId, Sidedef, SidedefId, Thing, ThingId,
    Vertex, VertexId,
};

/// Reference problems found when finishing a level.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("linedef {line} uses missing vertex {vertex}")]
    BadVertex { line: usize, vertex: VertexId },

    #[error("linedef {line} uses missing sidedef {side}")]
    BadSidedef { line: usize, side: SidedefId },

    #[error("sidedef {side} points at missing sector {sector}")]
    BadSector { side: usize, sector: SectorId },

    #[error("linedef {0} has no right sidedef")]
    NoRightSide(usize),
}

#[derive(Default)]
pub struct LevelBuilder {
    level: Level,
}

impl LevelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            level: Level {
                name: name.to_string(),
                ..Level::default()
            },
        }
    }

    /// Vertex at `(x, y)`; identical coordinates share one vertex.
    pub fn vertex(&mut self, x: f32, y: f32) -> VertexId {
        let p = vec2(x, y);
        if let Some(i) = self.level.vertices.iter().position(|v| v.pos == p) {
            return i as VertexId;
        }
        self.level.vertices.push(Vertex { pos: p });
        (self.level.vertices.len() - 1) as VertexId
    }

    pub fn sector(&mut self, floor_h: i32, ceil_h: i32, floor: &str, ceil: &str, light: i32) -> SectorId {
        self.level.sectors.push(Sector {
            floor_h,
            ceil_h,
            floor_tex: floor.to_string(),
            ceil_tex: ceil.to_string(),
            light,
        });
        (self.level.sectors.len() - 1) as SectorId
    }

    /// Sidedef facing into `sector` with upper / middle / lower textures.
    pub fn side(&mut self, sector: SectorId, upper: &str, middle: &str, lower: &str) -> SidedefId {
        self.level.sidedefs.push(Sidedef {
            x_off: 0,
            y_off: 0,
            upper: upper.to_string(),
            lower: lower.to_string(),
            middle: middle.to_string(),
            sector,
        });
        (self.level.sidedefs.len() - 1) as SidedefId
    }

    pub fn side_offsets(&mut self, sd: SidedefId, x_off: i32, y_off: i32) {
        if let Some(side) = self.level.sidedefs.get_mut(sd as usize) {
            side.x_off = x_off;
            side.y_off = y_off;
        }
    }

    /// Linedef `a → b`. A left sidedef makes the line two-sided.
    pub fn line(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        right: SidedefId,
        left: Option<SidedefId>,
    ) -> LinedefId {
        let v1 = self.vertex(a.0, a.1);
        let v2 = self.vertex(b.0, b.1);
        let flags = if left.is_some() {
            LinedefFlags::TWO_SIDED
        } else {
            LinedefFlags::IMPASSABLE
        };
        self.level.linedefs.push(Linedef {
            v1,
            v2,
            flags,
            right_sidedef: Some(right),
            left_sidedef: left,
        });
        (self.level.linedefs.len() - 1) as LinedefId
    }

    pub fn set_flags(&mut self, ld: LinedefId, flags: LinedefFlags) {
        if let Some(line) = self.level.linedefs.get_mut(ld as usize) {
            line.flags |= flags;
        }
    }

    /// Closed ring of one-sided walls around `sector`.
    ///
    /// Points go clockwise so every right side faces the interior.
    pub fn room(&mut self, sector: SectorId, pts: &[(f32, f32)], wall: &str) -> Vec<LinedefId> {
        let mut lines = Vec::with_capacity(pts.len());
        for (i, &a) in pts.iter().enumerate() {
            let b = pts[(i + 1) % pts.len()];
            let sd = self.side(sector, "-", wall, "-");
            lines.push(self.line(a, b, sd, None));
        }
        lines
    }

    pub fn thing(&mut self, pos: Vec2, z: i32, type_id: u16) -> ThingId {
        self.level.things.push(Thing {
            pos,
            z,
            type_id,
        });
        (self.level.things.len() - 1) as ThingId
    }

    /// Validate references and resolve thing sectors.
    pub fn build(mut self) -> Result<Level, LevelError> {
        let lvl = &self.level;

        for (i, sd) in lvl.sidedefs.iter().enumerate() {
            if sd.sector as usize >= lvl.sectors.len() {
                return Err(LevelError::BadSector {
                    side: i,
                    sector: sd.sector,
                });
            }
        }

        for (i, ld) in lvl.linedefs.iter().enumerate() {
            for v in [ld.v1, ld.v2] {
                if v as usize >= lvl.vertices.len() {
                    return Err(LevelError::BadVertex { line: i, vertex: v });
                }
            }
            if ld.right_sidedef.is_none() {
                return Err(LevelError::NoRightSide(i));
            }
            for side in [ld.right_sidedef, ld.left_sidedef].into_iter().flatten() {
                if side as usize >= lvl.sidedefs.len() {
                    return Err(LevelError::BadSidedef { line: i, side });
                }
            }
        }

        self.level.locate_things();
        Ok(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_corners_reuse_vertices() {
        let mut b = LevelBuilder::new("T");
        let s = b.sector(0, 128, "F", "C", 200);
        b.room(s, &[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)], "W");
        let lvl = b.build().unwrap();
        assert_eq!(lvl.vertices.len(), 4);
        assert_eq!(lvl.linedefs.len(), 4);
        // consecutive walls meet at one vertex
        assert_eq!(lvl.linedefs[0].v2, lvl.linedefs[1].v1);
    }

    #[test]
    fn dangling_sector_is_rejected() {
        let mut b = LevelBuilder::new("T");
        b.side(7, "-", "W", "-");
        assert_eq!(
            b.build().unwrap_err(),
            LevelError::BadSector { side: 0, sector: 7 }
        );
    }

    #[test]
    fn left_side_marks_two_sided() {
        let mut b = LevelBuilder::new("T");
        let s1 = b.sector(0, 128, "F", "C", 200);
        let s2 = b.sector(16, 112, "F", "C", 200);
        let front = b.side(s1, "U", "-", "L");
        let back = b.side(s2, "U", "-", "L");
        let ld = b.line((0.0, 0.0), (0.0, 64.0), front, Some(back));
        let lvl = b.build().unwrap();
        let line = &lvl.linedefs[ld as usize];
        assert_eq!(line.left_sidedef, Some(back));
        assert!(line.flags.contains(LinedefFlags::TWO_SIDED));
    }
}
