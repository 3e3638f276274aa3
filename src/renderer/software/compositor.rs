//! Column sweep over the active list.
//!
//! For every column the entities covering it are kept sorted nearest-first.
//! Opaque bands go front to back and shrink an open window of rows;
//! sprites and rails then go back to front, each clipped to the window
//! that was still open when the opaque pass reached it.

use glam::Vec2;
use smallvec::SmallVec;

use super::{
    entity::{Body, Entity},
    sink::{ColumnSink, Span},
    sort::ActiveSorter,
    surface::{SolidEdges, SurfKind, Surface},
};
use crate::renderer::{Part, View};

/// Neighbouring depths closer than this may have swapped order.
const IZ_EPSILON: f64 = 1e-5;

type ActiveList = SmallVec<[usize; 64]>;

/// Rows still open in the current column.
#[derive(Clone, Copy, Debug)]
struct Window {
    y1: i32,
    y2: i32,
}

impl Window {
    #[inline]
    fn closed(&self) -> bool {
        self.y1 > self.y2
    }
}

pub struct Compositor<'v> {
    view: &'v View,
    cam: Vec2,
    active: ActiveList,
}

impl<'v> Compositor<'v> {
    pub fn new(view: &'v View) -> Self {
        Self {
            view,
            cam: Vec2::new(view.x, view.y),
            active: ActiveList::new(),
        }
    }

    /// Composite every column of the screen into `sink`.
    ///
    /// Reorders `walls` by starting column.
    pub fn sweep(&mut self, walls: &mut [Entity<'_>], sink: &mut dyn ColumnSink) {
        walls.sort_by_key(|e| e.sx1);
        self.active.clear();

        for x in 0..self.view.screen_w {
            self.update_active_list(walls, x);

            if sink.only_column().is_some_and(|q| q != x) {
                continue;
            }

            self.column(walls, x, sink);
        }
    }

    fn update_active_list(&mut self, walls: &mut [Entity<'_>], x: i32) {
        let before = self.active.len();
        self.active.retain(|i| walls[*i].sx2 >= x);
        let mut changes = self.active.len() != before;

        // walls are sorted by sx1
        let start = walls.partition_point(|e| e.sx1 < x);
        let end = walls.partition_point(|e| e.sx1 <= x);
        if start != end {
            changes = true;
            self.active.extend(start..end);
        }

        let mut prev_iz = None;
        for &i in &self.active {
            let e = &mut walls[i];
            e.cur_iz = e.iz_at(x);

            if prev_iz.is_some_and(|p| p < e.cur_iz + IZ_EPSILON) {
                changes = true;
            }
            prev_iz = Some(e.cur_iz);
        }

        if changes {
            ActiveSorter::new(walls, self.cam).sort(&mut self.active);
        }
    }

    fn column(&self, walls: &mut [Entity<'_>], x: i32, sink: &mut dyn ColumnSink) {
        let mut open = Window {
            y1: 0,
            y2: self.view.screen_h - 1,
        };

        // front to back: opaque bands
        let mut stop = self.active.len();
        for (n, &i) in self.active.iter().enumerate() {
            let e = &mut walls[i];
            e.oy1 = open.y1;
            e.oy2 = open.y2;

            let e = &walls[i];
            let Body::Wall(wall) = &e.body else {
                continue;
            };

            let bands = [
                (&wall.surf.ceil, Part::Ceil),
                (&wall.surf.floor, Part::Floor),
                (&wall.surf.upper, Part::Upper),
                (&wall.surf.lower, Part::Lower),
            ];
            for (surf, part) in bands {
                if let Some(span) = self.wall_band(e, surf, x, &mut open) {
                    sink.wall_span(i, e, wall, surf, part, span);
                }
            }

            if open.closed() {
                stop = n + 1;
                break;
            }
        }

        // back to front: sprites and rails, from the entity that closed
        // the window (inclusive)
        for &i in self.active[..stop].iter().rev() {
            let e = &walls[i];
            match &e.body {
                Body::Sprite(sprite) => {
                    let y1 = self.view.dist_to_y(e.cur_iz, sprite.h2).max(e.oy1);
                    let y2 = (self.view.dist_to_y(e.cur_iz, sprite.h1) - 1).min(e.oy2);
                    if y1 <= y2 {
                        sink.sprite_span(i, e, sprite, Span { x, y1, y2 });
                    }
                }
                Body::Wall(wall) => {
                    let rail = &wall.surf.rail;
                    if rail.kind == SurfKind::Invis || rail.img.is_none() {
                        continue;
                    }
                    let y1 = self.view.dist_to_y(e.cur_iz, rail.h2).max(e.oy1);
                    let y2 = (self.view.dist_to_y(e.cur_iz, rail.h1) - 1).min(e.oy2);
                    if y1 <= y2 {
                        sink.rail_span(i, e, wall, rail, Span { x, y1, y2 });
                    }
                }
            }
        }
    }

    /// Visible rows of one opaque band; narrows `open` past its solid edges.
    fn wall_band(
        &self,
        e: &Entity<'_>,
        surf: &Surface<'_>,
        x: i32,
        open: &mut Window,
    ) -> Option<Span> {
        if surf.kind == SurfKind::Invis {
            return None;
        }

        let y1 = self.view.dist_to_y(e.cur_iz, surf.h2).max(open.y1);
        let y2 = (self.view.dist_to_y(e.cur_iz, surf.h1) - 1).min(open.y2);

        if surf.solid.contains(SolidEdges::ABOVE) {
            open.y1 = open.y1.max(y2 + 1);
        }
        if surf.solid.contains(SolidEdges::BELOW) {
            open.y2 = open.y2.min(y1 - 1);
        }

        (y1 <= y2).then_some(Span { x, y1, y2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        defs::ThingFlags,
        renderer::{
            GameColors, RenderOptions,
            software::entity::{Billboard, WallFace},
            software::sink::Pick,
            software::surface::WallSurfaces,
        },
        world::{Camera, Image, Side},
    };
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn view() -> View {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 64.0), FRAC_PI_2);
        View::new(&cam, 40, 40, RenderOptions::default(), GameColors::default())
    }

    /// Records everything it is handed.
    #[derive(Default)]
    struct Log {
        walls: Vec<(i32, usize, Part)>,
        sprites: Vec<(i32, usize)>,
    }

    impl ColumnSink for Log {
        fn wall_span(
            &mut self,
            idx: usize,
            _e: &Entity<'_>,
            _wall: &WallFace<'_>,
            _surf: &Surface<'_>,
            part: Part,
            span: Span,
        ) {
            self.walls.push((span.x, idx, part));
        }

        fn sprite_span(&mut self, idx: usize, _e: &Entity<'_>, _s: &Billboard<'_>, span: Span) {
            self.sprites.push((span.x, idx));
        }

        fn rail_span(
            &mut self,
            _idx: usize,
            _e: &Entity<'_>,
            _wall: &WallFace<'_>,
            _surf: &Surface<'_>,
            _span: Span,
        ) {
        }
    }

    fn solid_wall(line: u16, sx1: i32, sx2: i32, iz: f64) -> Entity<'static> {
        let mut surf = WallSurfaces::default();
        surf.lower = Surface {
            kind: SurfKind::Texture,
            h1: 0,
            h2: 128,
            tex_h: 128,
            solid: SolidEdges::ABOVE | SolidEdges::BELOW,
            ..Surface::default()
        };
        Entity {
            sx1,
            sx2,
            iz1: iz,
            iz2: iz,
            diz: 0.0,
            cur_iz: iz,
            mid_iz: iz,
            oy1: 0,
            oy2: 0,
            body: Body::Wall(WallFace {
                line,
                side: Side::Right,
                sidedef: 0,
                sector: 0,
                back_sector: None,
                v1: line * 2,
                v2: line * 2 + 1,
                p1: Vec2::ZERO,
                p2: Vec2::X,
                light: 160,
                sector_light: 160,
                delta_ang: 0.0,
                dist: 1.0,
                t_dist: 0.0,
                normal: 0.0,
                x_offset: 0,
                surf,
            }),
        }
    }

    fn sprite(img: &Image, thing: u16, sx1: i32, sx2: i32, iz: f64) -> Entity<'_> {
        Entity {
            sx1,
            sx2,
            iz1: iz,
            iz2: iz,
            diz: 0.0,
            cur_iz: iz,
            mid_iz: iz,
            oy1: 0,
            oy2: 0,
            body: Body::Sprite(Billboard {
                thing,
                pos: Vec2::new(thing as f32, 0.0),
                flags: ThingFlags::empty(),
                tx1: 0.0,
                scale: 1.0,
                light: 255,
                img,
                h1: 0,
                h2: 100,
            }),
        }
    }

    fn line_of(walls: &[Entity<'_>], idx: usize) -> u16 {
        walls[idx].wall().map(|w| w.line).unwrap_or(u16::MAX)
    }

    #[test]
    fn nearer_wall_hides_farther_one() {
        let v = view();
        let mut walls = vec![solid_wall(1, 0, 39, 0.001), solid_wall(0, 10, 19, 0.01)];
        let mut log = Log::default();
        Compositor::new(&v).sweep(&mut walls, &mut log);

        for x in 0..40 {
            let hits: Vec<_> = log.walls.iter().filter(|(cx, ..)| *cx == x).collect();
            assert_eq!(hits.len(), 1, "column {x}");
            let want = if (10..=19).contains(&x) { 0 } else { 1 };
            assert_eq!(line_of(&walls, hits[0].1), want, "column {x}");
        }
    }

    #[test]
    fn sprites_in_front_of_walls_are_drawn_and_behind_are_not() {
        let v = view();
        let img = Image::default();
        let mut walls = vec![
            solid_wall(0, 0, 39, 0.01),
            sprite(&img, 0, 5, 8, 0.02),
            sprite(&img, 1, 20, 25, 0.001),
        ];
        let mut log = Log::default();
        Compositor::new(&v).sweep(&mut walls, &mut log);

        let cols: Vec<_> = log.sprites.iter().map(|(x, _)| *x).collect();
        assert_eq!(cols, (5..=8).collect::<Vec<_>>());
    }

    #[test]
    fn pick_sees_only_its_column() {
        let v = view();
        let img = Image::default();
        let mut walls = vec![solid_wall(0, 0, 39, 0.01), sprite(&img, 0, 5, 8, 0.02)];

        let mut pick = Pick::new(6, 20);
        Compositor::new(&v).sweep(&mut walls, &mut pick);
        let (idx, part) = pick.hit.expect("hit");
        assert_eq!(part, Part::Thing);
        assert!(walls[idx].sprite().is_some());

        let mut pick = Pick::new(30, 20);
        Compositor::new(&v).sweep(&mut walls, &mut pick);
        let (idx, part) = pick.hit.expect("hit");
        assert_eq!(part, Part::Lower);
        assert_eq!(line_of(&walls, idx), 0);
    }

    #[test]
    fn empty_list_draws_nothing() {
        let v = view();
        let mut walls: Vec<Entity<'_>> = Vec::new();
        let mut log = Log::default();
        Compositor::new(&v).sweep(&mut walls, &mut log);
        assert!(log.walls.is_empty() && log.sprites.is_empty());
    }
}
