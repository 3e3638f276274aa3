//! Projected drawables: one wall face or one sprite, with its screen span
//! and the inverse depth needed to interpolate across it.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::Vec2;

use super::{projection::point_to_angle, surface::WallSurfaces};
use crate::{
    defs::{ThingFlags, thing_info},
    renderer::View,
    world::{
        AssetQuery, Image, LinedefId, MapGeometry, SectorId, Side, SidedefId, ThingId, VertexId,
    },
};

/// Left and right edges of the 90° view volume.
const LEFT_CLIP: f32 = 3.0 * FRAC_PI_4;
const RIGHT_CLIP: f32 = FRAC_PI_4;

/// Sprites closer than this to the view plane are dropped.
const MIN_SPRITE_DEPTH: f32 = 4.0;

/// Ceiling height assumed for hanging things outside any sector.
const VOID_CEIL: i32 = 192;

/// The side of a linedef that faces the camera.
#[derive(Clone, Debug)]
pub struct WallFace<'a> {
    pub line: LinedefId,
    pub side: Side,
    pub sidedef: SidedefId,
    pub sector: SectorId,
    pub back_sector: Option<SectorId>,

    /// linedef endpoints, in linedef order
    pub v1: VertexId,
    pub v2: VertexId,
    pub p1: Vec2,
    pub p2: Vec2,

    /// sector light with the axis-aligned contrast applied
    pub light: i32,
    pub sector_light: i32,

    // texture-column mapping
    pub delta_ang: f32,
    pub dist: f32,
    pub t_dist: f32,
    pub normal: f32,
    pub x_offset: i32,

    pub surf: WallSurfaces<'a>,
}

impl WallFace<'_> {
    #[inline]
    pub fn one_sided(&self) -> bool {
        self.back_sector.is_none()
    }
}

/// A thing drawn as a camera-facing billboard.
#[derive(Clone, Debug)]
pub struct Billboard<'a> {
    pub thing: ThingId,
    pub pos: Vec2,
    pub flags: ThingFlags,
    /// lateral view-space offset of the left edge
    pub tx1: f32,
    pub scale: f32,
    pub light: i32,
    pub img: &'a Image,
    /// world heights of the bottom / top edge
    pub h1: i32,
    pub h2: i32,
}

#[derive(Clone, Debug)]
pub enum Body<'a> {
    Wall(WallFace<'a>),
    Sprite(Billboard<'a>),
}

/// Anything that covers screen columns `sx1 ..= sx2`.
#[derive(Clone, Debug)]
pub struct Entity<'a> {
    pub sx1: i32,
    pub sx2: i32,

    pub iz1: f64,
    pub iz2: f64,
    /// change of `iz` per column
    pub diz: f64,
    /// `iz` at the column being composited
    pub cur_iz: f64,
    /// rough depth used by the occlusion clipper
    pub mid_iz: f64,

    /// open window left over after the opaque pass, for sprites and rails
    pub oy1: i32,
    pub oy2: i32,

    pub body: Body<'a>,
}

impl<'a> Entity<'a> {
    /// Inverse depth at column `x`.
    #[inline]
    pub fn iz_at(&self, x: i32) -> f64 {
        self.iz1 + self.diz * (x - self.sx1) as f64
    }

    #[inline]
    pub fn covers(&self, x: i32) -> bool {
        self.sx1 <= x && x <= self.sx2
    }

    #[inline]
    pub fn wall(&self) -> Option<&WallFace<'a>> {
        match &self.body {
            Body::Wall(w) => Some(w),
            Body::Sprite(_) => None,
        }
    }

    #[inline]
    pub fn sprite(&self) -> Option<&Billboard<'a>> {
        match &self.body {
            Body::Sprite(s) => Some(s),
            Body::Wall(_) => None,
        }
    }

    /// Project linedef `line_id` as seen from `view`.
    ///
    /// Returns `None` when the line is behind the camera, outside the view
    /// volume, edge-on, or faces the camera with a missing sidedef. When
    /// `only_column` is set, lines not covering that column are skipped too.
    pub fn add_line(
        view: &View,
        map: &dyn MapGeometry,
        line_id: LinedefId,
        only_column: Option<i32>,
    ) -> Option<Self> {
        let ld = map.linedefs().get(line_id as usize)?;
        let p1 = map.vertices().get(ld.v1 as usize)?.pos;
        let p2 = map.vertices().get(ld.v2 as usize)?.pos;

        ld.right_sidedef?;

        let (x1, y1) = (p1.x - view.x, p1.y - view.y);
        let (x2, y2) = (p2.x - view.x, p2.y - view.y);

        let (tx1, ty1) = view.rotate(x1, y1);
        let (tx2, ty2) = view.rotate(x2, y2);

        // reject line if completely behind the view plane
        if ty1 <= 0.0 && ty2 <= 0.0 {
            return None;
        }

        let mut angle1 = point_to_angle(tx1, ty1);
        let mut angle2 = point_to_angle(tx2, ty2);

        let mut span = angle1 - angle2;
        if span < 0.0 {
            span += TAU;
        }

        let side = if span >= PI { Side::Left } else { Side::Right };

        // ignore the line when there is no facing sidedef
        let sidedef = ld.sidedef(side)?;
        let sd = map.sidedefs().get(sidedef as usize)?;
        let sector = map.sectors().get(sd.sector as usize)?;

        let other = match side {
            Side::Right => ld.left_sidedef,
            Side::Left => ld.right_sidedef,
        };
        let back_sector = other
            .and_then(|s| map.sidedefs().get(s as usize))
            .map(|s| s.sector)
            .filter(|&s| (s as usize) < map.sectors().len());

        if side == Side::Left {
            std::mem::swap(&mut angle1, &mut angle2);
        }

        /* clip angles to the view volume */

        let base_ang = angle1;

        let mut tspan1 = angle1 - RIGHT_CLIP;
        let mut tspan2 = LEFT_CLIP - angle2;
        if tspan1 < 0.0 {
            tspan1 += TAU;
        }
        if tspan2 < 0.0 {
            tspan2 += TAU;
        }

        if tspan1 > FRAC_PI_2 {
            // totally off the left edge?
            if tspan2 >= PI {
                return None;
            }
            angle1 = LEFT_CLIP;
        }
        if tspan2 > FRAC_PI_2 {
            // totally off the right edge?
            if tspan1 >= PI {
                return None;
            }
            angle2 = RIGHT_CLIP;
        }

        let sx1 = view.angle_to_x(angle1);
        let sx2 = view.angle_to_x(angle2) - 1;

        if sx1 > sx2 {
            return None;
        }
        if only_column.is_some_and(|q| sx2 < q || sx1 > q) {
            return None;
        }

        // perpendicular distance from the eye to the (infinite) wall
        let (wdx, wdy) = (x2 - x1, y2 - y1);
        let wlen = (wdx * wdx + wdy * wdy).sqrt();
        if wlen <= 0.0 {
            return None;
        }
        let dist = ((y1 * wdx / wlen) - (x1 * wdy / wlen)).abs();
        if dist < 0.01 {
            return None;
        }

        let normal = match side {
            Side::Left => point_to_angle(ty2 - ty1, tx1 - tx2),
            Side::Right => point_to_angle(ty1 - ty2, tx2 - tx1),
        };

        let edge_iz = |ang: f32| -> f64 {
            let (ang, normal, dist) = (ang as f64, normal as f64, dist as f64);
            (normal - ang).cos() / dist / (std::f64::consts::FRAC_PI_2 - ang).cos()
        };

        let iz1 = edge_iz(angle1);
        let (iz2, diz) = if sx2 > sx1 {
            let iz2 = edge_iz(angle2);
            (iz2, (iz2 - iz1) / (sx2 - sx1) as f64)
        } else {
            (iz1, 0.0)
        };
        let mid_iz = iz1 + (sx2 - sx1 + 1) as f64 * diz / 2.0;

        // fake contrast for axis-aligned walls
        let mut light = sector.light;
        if p1.x == p2.x {
            light += 16;
        } else if p1.y == p2.y {
            light -= 16;
        }

        let face = WallFace {
            line: line_id,
            side,
            sidedef,
            sector: sd.sector,
            back_sector,
            v1: ld.v1,
            v2: ld.v2,
            p1,
            p2,
            light,
            sector_light: sector.light,
            delta_ang: angle1 - view.x_to_angle(sx1) - normal,
            dist,
            t_dist: (base_ang - normal).tan() * dist,
            normal,
            x_offset: sd.x_off,
            surf: WallSurfaces::default(),
        };

        Some(Entity {
            sx1,
            sx2,
            iz1,
            iz2,
            diz,
            cur_iz: iz1,
            mid_iz,
            oy1: 0,
            oy2: view.screen_h - 1,
            body: Body::Wall(face),
        })
    }

    /// Project thing `thing_id` as a billboard.
    ///
    /// `lit_thing` is drawn full-bright (the hovered thing).
    pub fn add_thing(
        view: &View,
        map: &dyn MapGeometry,
        assets: &'a dyn AssetQuery,
        thing_id: ThingId,
        lit_thing: Option<ThingId>,
        only_column: Option<i32>,
    ) -> Option<Self> {
        let th = map.things().get(thing_id as usize)?;
        let info = thing_info(th.type_id);

        let (tx, ty) = view.rotate(th.pos.x - view.x, th.pos.y - view.y);

        // reject sprite if (nearly) behind the view plane
        if ty < MIN_SPRITE_DEPTH {
            return None;
        }

        let mut flags = info.flags;
        let img = match assets.sprite(info.sprite) {
            Some(img) => img,
            None => {
                if view.options.unknown_bright {
                    flags |= ThingFlags::LIT;
                }
                assets.unknown_sprite()
            }
        };
        if lit_thing == Some(thing_id) {
            flags |= ThingFlags::LIT;
        }

        let scale = info.scale;
        let half_w = img.w as f32 * scale / 2.0;
        let tx1 = tx - half_w;
        let tx2 = tx + half_w;

        let iz = 1.0 / ty as f64;

        let sx1 = view.delta_to_x(iz, tx1).max(0);
        let sx2 = (view.delta_to_x(iz, tx2) - 1).min(view.screen_w - 1);

        if sx1 > sx2 {
            return None;
        }
        if only_column.is_some_and(|q| sx2 < q || sx1 > q) {
            return None;
        }

        let sector = map
            .thing_sector(thing_id)
            .and_then(|s| map.sectors().get(s as usize));

        let img_h = img.h as f32 * scale;
        let (h1, h2) = if flags.contains(ThingFlags::CEIL) {
            let h2 = sector.map_or(VOID_CEIL, |s| s.ceil_h) - th.z;
            ((h2 as f32 - img_h) as i32, h2)
        } else {
            let h1 = sector.map_or(0, |s| s.floor_h) + th.z;
            (h1, (h1 as f32 + img_h) as i32)
        };

        let sprite = Billboard {
            thing: thing_id,
            pos: th.pos,
            flags,
            tx1,
            scale,
            light: sector.map_or(255, |s| s.light),
            img,
            h1,
            h2,
        };

        Some(Entity {
            sx1,
            sx2,
            iz1: iz,
            iz2: iz,
            diz: 0.0,
            cur_iz: iz,
            mid_iz: iz,
            oy1: 0,
            oy2: view.screen_h - 1,
            body: Body::Sprite(sprite),
        })
    }
}
