//! Outlines for the hovered and selected objects, drawn over the blitted
//! frame in output pixels.

use bitflags::bitflags;

use super::entity::{Body, Entity, WallFace};
use crate::{
    renderer::{Obj3d, Part, Rgba, Selection, View},
    world::{LinedefId, MapGeometry, SectorId, Side, ThingId},
};

pub const SEL_COLOR: Rgba = 0x0040_A0FF;
pub const HOVER_COLOR: Rgba = 0x00FF_FF40;
pub const HOVER_SEL_COLOR: Rgba = 0x00FF_80FF;

/// Projected heights past this are not worth outlining.
const COORD_LIMIT: i32 = 5000;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Mark: u8 {
        const SELECTED = 0x01;
        const HOVER    = 0x02;
    }
}

impl Mark {
    fn color(self) -> Rgba {
        if self.contains(Mark::SELECTED | Mark::HOVER) {
            HOVER_SEL_COLOR
        } else if self.contains(Mark::HOVER) {
            HOVER_COLOR
        } else {
            SEL_COLOR
        }
    }
}

#[inline]
fn off_screen(ys: &[i32]) -> bool {
    ys.iter().any(|y| !(-COORD_LIMIT..=COORD_LIMIT).contains(y))
}

pub struct Outliner<'o> {
    view: &'o View,
    map: &'o dyn MapGeometry,
    walls: &'o [Entity<'o>],
    out: &'o mut [Rgba],
}

impl<'o> Outliner<'o> {
    pub fn new(
        view: &'o View,
        map: &'o dyn MapGeometry,
        walls: &'o [Entity<'o>],
        out: &'o mut [Rgba],
    ) -> Self {
        Self {
            view,
            map,
            walls,
            out,
        }
    }

    /// Outline every selected object, then the hovered one unless it is
    /// also selected.
    pub fn draw(&mut self, selection: &Selection) {
        let mut saw_hover = false;

        for obj in &selection.selected {
            if !obj.is_valid(self.map) {
                continue;
            }
            let mut mark = Mark::SELECTED;
            if selection.hover == Some(*obj) {
                mark |= Mark::HOVER;
                saw_hover = true;
            }
            self.object(obj, mark);
        }

        if !saw_hover {
            if let Some(hover) = selection.hover.filter(|h| h.is_valid(self.map)) {
                self.object(&hover, Mark::HOVER);
            }
        }
    }

    fn object(&mut self, obj: &Obj3d, mark: Mark) {
        match *obj {
            Obj3d::Thing(th) => self.thing(th, mark),
            Obj3d::Sector { sector, part } => self.sector(sector, part, mark),
            Obj3d::Line { line, side, part } => self.line(line, side, part, mark),
        }
    }

    fn thing(&mut self, th: ThingId, mark: Mark) {
        let walls = self.walls;
        let Some((e, b)) = walls.iter().find_map(|e| match &e.body {
            Body::Sprite(b) if b.thing == th => Some((e, b)),
            _ => None,
        }) else {
            return;
        };

        let (x1, x2) = (e.sx1 - 1, e.sx2 + 1);
        let y1 = self.view.dist_to_y(e.iz1, b.h2 + 1);
        let y2 = self.view.dist_to_y(e.iz1, b.h1 - 1);

        self.segment(x1, y1, x1, y2, mark);
        self.segment(x2, y1, x2, y2, mark);
        self.segment(x1, y1, x2, y1, mark);
        self.segment(x1, y2, x2, y2, mark);
    }

    /// The lines where the sector's floor or ceiling meets its walls.
    fn sector(&mut self, sector: SectorId, part: Part, mark: Mark) {
        let Some(sec) = self.map.sectors().get(sector as usize) else {
            return;
        };
        let sec_h = match part {
            Part::Floor if (sec.floor_h as f32) < self.view.z => sec.floor_h,
            Part::Ceil if (sec.ceil_h as f32) > self.view.z => sec.ceil_h,
            _ => return,
        };

        let walls = self.walls;
        for e in walls {
            let Body::Wall(w) = &e.body else {
                continue;
            };
            if !self.touches_sector(w.line, sector) {
                continue;
            }

            let sy1 = self.view.dist_to_y(e.iz1, sec_h);
            let sy2 = self.view.dist_to_y(e.iz2, sec_h);
            if off_screen(&[sy1, sy2]) {
                continue;
            }
            self.segment(e.sx1, sy1, e.sx2, sy2, mark);
        }
    }

    fn line(&mut self, line: LinedefId, side: Side, part: Part, mark: Mark) {
        let walls = self.walls;
        for e in walls {
            match &e.body {
                Body::Wall(w) if w.line == line && w.side == side => self.wall_part(e, w, part, mark),
                _ => {}
            }
        }
    }

    fn wall_part(&mut self, e: &Entity<'_>, w: &WallFace<'_>, part: Part, mark: Mark) {
        let sectors = self.map.sectors();
        let Some(front) = sectors.get(w.sector as usize) else {
            return;
        };

        let (h1, h2) = match w.back_sector.and_then(|s| sectors.get(s as usize)) {
            None => (front.floor_h, front.ceil_h),
            Some(back) if part == Part::Lower => (
                front.floor_h.min(back.floor_h),
                front.floor_h.max(back.floor_h),
            ),
            Some(back) => (
                front.ceil_h.min(back.ceil_h),
                front.ceil_h.max(back.ceil_h),
            ),
        };

        let (x1, x2) = (e.sx1 - 1, e.sx2 + 1);

        let ly1 = self.view.dist_to_y(e.iz1, h2);
        let ly2 = self.view.dist_to_y(e.iz1, h1);
        let ry1 = self.view.dist_to_y(e.iz2, h2);
        let ry2 = self.view.dist_to_y(e.iz2, h1);

        if off_screen(&[ly1, ly2, ry1, ry2]) {
            return;
        }

        self.segment(x1, ly1, x1, ly2, mark);
        self.segment(x2, ry1, x2, ry2, mark);
        self.segment(x1, ly1, x2, ry1, mark);
        self.segment(x1, ly2, x2, ry2, mark);
    }

    fn touches_sector(&self, line: LinedefId, sector: SectorId) -> bool {
        let Some(ld) = self.map.linedefs().get(line as usize) else {
            return false;
        };
        [ld.right_sidedef, ld.left_sidedef]
            .into_iter()
            .flatten()
            .filter_map(|sd| self.map.sidedefs().get(sd as usize))
            .any(|sd| sd.sector == sector)
    }

    /// Screen-space segment, scaled up to output pixels in low detail.
    fn segment(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, mark: Mark) {
        let k = if self.view.options.high_detail { 1 } else { 2 };
        let thick = mark.contains(Mark::SELECTED);
        self.draw_line(x0 * k, y0 * k, x1 * k, y1 * k, mark.color(), thick);
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, col: Rgba) {
        let (w, h) = (self.view.out_w as i32, self.view.out_h as i32);
        if (0..w).contains(&x) && (0..h).contains(&y) {
            if let Some(p) = self.out.get_mut(y as usize * w as usize + x as usize) {
                *p = col;
            }
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba, thick: bool) {
        let mut x0 = x0;
        let mut y0 = y0;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x0, y0, col);
            if thick {
                self.plot(x0 + 1, y0, col);
                self.plot(x0, y0 + 1, col);
                self.plot(x0 + 1, y0 + 1, col);
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{GameColors, RenderOptions};
    use crate::world::{Camera, Level};
    use glam::Vec3;

    fn view(high_detail: bool) -> View {
        let cam = Camera::new(Vec3::ZERO, 0.0);
        let options = RenderOptions {
            high_detail,
            ..RenderOptions::default()
        };
        View::new(&cam, 20, 10, options, GameColors::default())
    }

    #[test]
    fn mark_colors() {
        assert_eq!(Mark::SELECTED.color(), SEL_COLOR);
        assert_eq!(Mark::HOVER.color(), HOVER_COLOR);
        assert_eq!((Mark::SELECTED | Mark::HOVER).color(), HOVER_SEL_COLOR);
    }

    #[test]
    fn lines_are_clipped_to_the_output() {
        let v = view(true);
        let lvl = Level::default();
        let mut out = vec![0; 200];
        let mut o = Outliner::new(&v, &lvl, &[], &mut out);
        o.segment(-5, 2, 30, 2, Mark::HOVER);
        drop(o);
        assert!(out[2 * 20..3 * 20].iter().all(|&c| c == HOVER_COLOR));
        assert_eq!(out.iter().filter(|&&c| c != 0).count(), 20);
    }

    #[test]
    fn low_detail_doubles_and_selection_is_thick() {
        let v = view(false);
        let lvl = Level::default();
        let mut out = vec![0; 200];
        let mut o = Outliner::new(&v, &lvl, &[], &mut out);
        o.segment(1, 1, 1, 1, Mark::SELECTED);
        drop(o);
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert_eq!(out[y * 20 + x], SEL_COLOR);
        }
        assert_eq!(out.iter().filter(|&&c| c != 0).count(), 4);
    }

    #[test]
    fn invalid_objects_are_ignored() {
        let v = view(true);
        let lvl = Level::default();
        let mut out = vec![0; 200];
        let sel = Selection {
            hover: Some(Obj3d::Thing(3)),
            selected: vec![Obj3d::Sector {
                sector: 0,
                part: Part::Floor,
            }],
        };
        Outliner::new(&v, &lvl, &[], &mut out).draw(&sel);
        assert!(out.iter().all(|&c| c == 0));
    }
}
