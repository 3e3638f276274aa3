//! ---------------------------------------------------------------------------
//! Software (CPU) preview renderer with picking
//!
//! * Every linedef side facing the camera and every thing becomes an
//!   [`Entity`]: a screen column span plus linearly interpolated inverse
//!   depth. There is no BSP; the map can be edited between frames.
//! * A rough per-column depth buffer drops entities hidden behind one-sided
//!   walls, then a left-to-right column sweep keeps the entities covering
//!   each column sorted nearest-first and hands visible runs to a
//!   [`ColumnSink`]: [`Paint`] writes palette pixels, [`Pick`] records what
//!   lies under one pixel.
//! * The internal screen is palette-indexed and is blitted to 0x00RRGGBB
//!   afterwards, at half resolution in low detail.
//! ---------------------------------------------------------------------------

mod blit;
mod clip;
mod columns;
mod compositor;
mod entity;
mod highlight;
mod lighting;
mod projection;
mod query;
mod sink;
mod sort;
mod surface;

pub use self::{
    entity::{Billboard, Body, Entity, WallFace},
    highlight::{HOVER_COLOR, HOVER_SEL_COLOR, SEL_COLOR},
    lighting::light_index,
    projection::point_to_angle,
    sink::{ColumnSink, Paint, Pick, Span},
    surface::{SolidEdges, SurfKind, Surface, WallSurfaces, hashed_color},
};

use log::{debug, warn};

use self::{
    clip::clip_solids, compositor::Compositor, highlight::Outliner, surface::WallContext,
};
use crate::{
    renderer::{Obj3d, Renderer, Rgba, Selection, View},
    world::{AssetQuery, LinedefId, MapGeometry, Pixel, ThingId},
};

/*───────────────────────────────────────────────────────────────────────*/
/*                               Frame                                  */
/*───────────────────────────────────────────────────────────────────────*/

/// Entities of one render or query call, discarded afterwards.
pub struct Frame<'a> {
    pub walls: Vec<Entity<'a>>,
}

impl<'a> Frame<'a> {
    /// Project, clip and resolve surfaces.
    ///
    /// With `only_column` set, entities not covering that column are never
    /// built.
    pub fn build(
        view: &View,
        map: &dyn MapGeometry,
        assets: &'a dyn AssetQuery,
        lit_thing: Option<ThingId>,
        only_column: Option<i32>,
    ) -> Self {
        let mut walls: Vec<Entity<'a>> = (0..map.linedefs().len())
            .filter_map(|i| LinedefId::try_from(i).ok())
            .filter_map(|i| Entity::add_line(view, map, i, only_column))
            .collect();
        let lines = walls.len();

        if view.options.sprites {
            walls.extend(
                (0..map.things().len())
                    .filter_map(|k| ThingId::try_from(k).ok())
                    .filter_map(|k| {
                        Entity::add_thing(view, map, assets, k, lit_thing, only_column)
                    }),
            );
        }
        let built = walls.len();

        clip_solids(&mut walls, view.screen_w);

        let mut frame = Frame { walls };
        frame.compute_surfaces(view, map, assets);

        debug!(
            "frame: {} walls + {} sprites built, {} after clipping",
            lines,
            built - lines,
            frame.walls.len()
        );
        frame
    }

    fn compute_surfaces(&mut self, view: &View, map: &dyn MapGeometry, assets: &'a dyn AssetQuery) {
        let sectors = map.sectors();

        for e in &mut self.walls {
            let Body::Wall(w) = &mut e.body else {
                continue;
            };
            let (Some(line), Some(side), Some(front)) = (
                map.linedefs().get(w.line as usize),
                map.sidedefs().get(w.sidedef as usize),
                sectors.get(w.sector as usize),
            ) else {
                continue;
            };

            let ctx = WallContext {
                line,
                side,
                front,
                back: w.back_sector.and_then(|s| sectors.get(s as usize)),
                self_ref: w.back_sector == Some(w.sector),
            };
            w.surf = WallSurfaces::resolve(&ctx, view, assets);
        }
    }
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column renderer over a palette-indexed scratch screen.
#[derive(Default)]
pub struct Software {
    screen: Vec<Pixel>,
}

impl Software {
    /// Draw the world into `screen` (`view.screen_len()` palette pixels).
    ///
    /// `lit_thing` is drawn full-bright. Returns the frame's entities for
    /// outlining.
    pub fn render_screen<'a>(
        view: &View,
        map: &dyn MapGeometry,
        assets: &'a dyn AssetQuery,
        lit_thing: Option<ThingId>,
        screen: &mut [Pixel],
    ) -> Frame<'a> {
        if screen.len() != view.screen_len() {
            warn!(
                "screen holds {} pixels, view needs {}",
                screen.len(),
                view.screen_len()
            );
            return Frame { walls: Vec::new() };
        }

        // unpainted pixels keep index 0
        screen.fill(0);

        let mut frame = Frame::build(view, map, assets, lit_thing, None);
        let mut paint = Paint {
            view,
            colormap: assets.colormap(),
            screen,
        };
        Compositor::new(view).sweep(&mut frame.walls, &mut paint);
        frame
    }

    /// Object under internal screen pixel `(sx, sy)`.
    pub fn query_screen(
        view: &View,
        map: &dyn MapGeometry,
        assets: &dyn AssetQuery,
        sx: i32,
        sy: i32,
    ) -> Option<Obj3d> {
        query::query(view, map, assets, sx, sy)
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn render_world(
        &mut self,
        view: &View,
        map: &dyn MapGeometry,
        assets: &dyn AssetQuery,
        selection: &Selection,
        out: &mut [Rgba],
    ) {
        if view.out_w == 0 || view.out_h == 0 {
            return;
        }
        if out.len() < view.out_w * view.out_h {
            warn!(
                "output holds {} pixels, view needs {}x{}",
                out.len(),
                view.out_w,
                view.out_h
            );
            return;
        }

        self.screen.clear();
        self.screen.resize(view.screen_len(), 0);

        let lit_thing = selection.hover.and_then(|h| h.thing());
        let frame = Self::render_screen(view, map, assets, lit_thing, &mut self.screen);

        blit::blit(view, assets.palette(), &self.screen, out);
        Outliner::new(view, map, &frame.walls, out).draw(selection);
    }

    fn query_point(
        &mut self,
        view: &View,
        map: &dyn MapGeometry,
        assets: &dyn AssetQuery,
        qx: i32,
        qy: i32,
    ) -> Option<Obj3d> {
        let (w, h) = (view.out_w as i32, view.out_h as i32);
        if !(0..w).contains(&qx) || !(0..h).contains(&qy) {
            return None;
        }
        let (sx, sy) = if view.options.high_detail {
            (qx, qy)
        } else {
            (qx / 2, qy / 2)
        };
        Self::query_screen(view, map, assets, sx, sy)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
