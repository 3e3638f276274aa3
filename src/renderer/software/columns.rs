//! Per-column pixel painters.

use std::f32::consts::FRAC_PI_2;

use super::{
    entity::{Billboard, WallFace},
    lighting::light_index,
    sink::{Paint, Span},
    surface::Surface,
};
use crate::{
    defs::ThingFlags,
    world::{Image, Pixel, TRANS_PIXEL},
};

/// Colormap row used to darken whatever is behind an invisible thing.
const INVIS_MAP: usize = 14;

impl Paint<'_> {
    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.view.screen_w as usize + x as usize
    }

    #[inline]
    fn shade(&self, light: i32, dist: f32, pix: Pixel, fullbright: bool) -> Pixel {
        if self.view.options.lighting && !fullbright {
            self.colormap[light_index(light, dist)][pix as usize]
        } else {
            pix
        }
    }

    /// Floor or ceiling, textured by casting each row back onto the plane.
    pub fn flat_column(&mut self, wall: &WallFace<'_>, surf: &Surface<'_>, img: &Image, span: Span) {
        let view = self.view;
        let tw = img.w as i32;
        let th = img.h as i32;

        let ang = view.x_to_angle(span.x);
        let modv = ang.sin().max(1e-3);
        let (t_sin, t_cos) = (view.angle + ang - FRAC_PI_2).sin_cos();
        let (t_sin, t_cos) = (t_sin / modv, t_cos / modv);

        for y in span.y1..=span.y2 {
            let dist = view.y_to_dist(y, surf.tex_h);

            let tx = ((view.x + t_cos * dist) as i32).rem_euclid(tw);
            let ty = ((-(view.y + t_sin * dist)) as i32).rem_euclid(th);

            let pix = img.pixel(tx as usize, ty as usize);
            let o = self.offset(span.x, y);
            let out = self.shade(wall.sector_light, dist, pix, surf.fullbright);
            self.screen[o] = out;
        }
    }

    pub fn solid_flat_column(&mut self, wall: &WallFace<'_>, surf: &Surface<'_>, span: Span) {
        for y in span.y1..=span.y2 {
            let dist = self.view.y_to_dist(y, surf.tex_h);
            let o = self.offset(span.x, y);
            let out = self.shade(wall.sector_light, dist, surf.col, surf.fullbright);
            self.screen[o] = out;
        }
    }

    /// Wall band (upper, lower, one-sided or rail).
    pub fn tex_column(
        &mut self,
        wall: &WallFace<'_>,
        cur_iz: f64,
        surf: &Surface<'_>,
        img: &Image,
        span: Span,
    ) {
        let view = self.view;
        let tw = img.w as i32;
        let th = img.h as i32;
        let dist = (1.0 / cur_iz) as f32;

        let cur_ang = wall.delta_ang + view.x_to_angle(span.x);
        let tx = (wall.t_dist - cur_ang.tan() * wall.dist) as i32;
        let tx = wall.x_offset.wrapping_add(tx).rem_euclid(tw) as usize;

        let mut hh = surf.tex_h as f32 - view.y_to_sec_h(span.y1, cur_iz);
        let end = surf.tex_h as f32 - view.y_to_sec_h(span.y2, cur_iz);
        let dh = (end - hh) / (span.y2 - span.y1).max(1) as f32;
        hh += 0.2;

        for y in span.y1..=span.y2 {
            let ty = (hh.floor() as i32).rem_euclid(th) as usize;
            hh += dh;

            let pix = img.pixel(tx, ty);
            if pix == TRANS_PIXEL {
                continue;
            }
            let o = self.offset(span.x, y);
            let out = self.shade(wall.light, dist, pix, surf.fullbright);
            self.screen[o] = out;
        }
    }

    pub fn solid_tex_column(&mut self, wall: &WallFace<'_>, cur_iz: f64, surf: &Surface<'_>, span: Span) {
        let dist = (1.0 / cur_iz) as f32;
        let pix = self.shade(wall.light, dist, surf.col, surf.fullbright);
        for y in span.y1..=span.y2 {
            let o = self.offset(span.x, y);
            self.screen[o] = pix;
        }
    }

    pub fn sprite_column(&mut self, sprite: &Billboard<'_>, cur_iz: f64, span: Span) {
        let view = self.view;
        let img = sprite.img;
        let tw = img.w as i32;
        let th = img.h as i32;
        let scale = sprite.scale;

        let tx = ((view.x_to_delta(span.x, cur_iz) - sprite.tx1) / scale) as i32;
        if tx < 0 || tx >= tw {
            return;
        }

        let mut hh = sprite.h2 as f32 - view.y_to_sec_h(span.y1, cur_iz);
        let end = sprite.h2 as f32 - view.y_to_sec_h(span.y2, cur_iz);
        let dh = (end - hh) / (span.y2 - span.y1).max(1) as f32;

        let dist = (1.0 / cur_iz) as f32;
        let invis = sprite.flags.contains(ThingFlags::INVIS);
        let lit = sprite.flags.contains(ThingFlags::LIT);

        for y in span.y1..=span.y2 {
            let ty = (hh / scale) as i32;
            hh += dh;

            if ty < 0 || ty >= th {
                continue;
            }
            let pix = img.pixel(tx as usize, ty as usize);
            if pix == TRANS_PIXEL {
                continue;
            }

            let o = self.offset(span.x, y);
            let out = if invis {
                self.colormap[INVIS_MAP][self.screen[o] as usize]
            } else {
                self.shade(sprite.light, dist, pix, lit)
            };
            self.screen[o] = out;
        }
    }
}
