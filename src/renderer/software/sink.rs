//! Where composited column runs go: onto the screen, or into a pick test.

use log::trace;

use super::{
    entity::{Billboard, Entity, WallFace},
    surface::{SurfKind, Surface},
};
use crate::{
    renderer::{Part, View},
    world::{Colormap, Pixel},
};

/// Visible rows `y1 ..= y2` of one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub y1: i32,
    pub y2: i32,
}

impl Span {
    #[inline]
    pub fn contains_row(&self, y: i32) -> bool {
        self.y1 <= y && y <= self.y2
    }
}

/// Receives every visible run the compositor produces.
///
/// `idx` is the entity's position in the frame's entity list.
pub trait ColumnSink {
    /// Restrict compositing to one column.
    fn only_column(&self) -> Option<i32> {
        None
    }

    fn wall_span(
        &mut self,
        idx: usize,
        e: &Entity<'_>,
        wall: &WallFace<'_>,
        surf: &Surface<'_>,
        part: Part,
        span: Span,
    );

    fn sprite_span(&mut self, idx: usize, e: &Entity<'_>, sprite: &Billboard<'_>, span: Span);

    /// See-through middle texture of a two-sided wall.
    fn rail_span(
        &mut self,
        idx: usize,
        e: &Entity<'_>,
        wall: &WallFace<'_>,
        surf: &Surface<'_>,
        span: Span,
    );
}

/// Draws into a palette-indexed screen of `view.screen_w * view.screen_h`.
pub struct Paint<'s> {
    pub view: &'s View,
    pub colormap: &'s Colormap,
    pub screen: &'s mut [Pixel],
}

impl ColumnSink for Paint<'_> {
    fn wall_span(
        &mut self,
        _idx: usize,
        e: &Entity<'_>,
        wall: &WallFace<'_>,
        surf: &Surface<'_>,
        _part: Part,
        span: Span,
    ) {
        match (surf.kind, surf.img) {
            (SurfKind::Invis, _) => {}
            (SurfKind::Flat, Some(img)) => self.flat_column(wall, surf, img, span),
            (SurfKind::Flat, None) => self.solid_flat_column(wall, surf, span),
            (SurfKind::Texture, Some(img)) => self.tex_column(wall, e.cur_iz, surf, img, span),
            (SurfKind::Texture, None) => self.solid_tex_column(wall, e.cur_iz, surf, span),
        }
    }

    fn sprite_span(&mut self, _idx: usize, e: &Entity<'_>, sprite: &Billboard<'_>, span: Span) {
        self.sprite_column(sprite, e.cur_iz, span);
    }

    fn rail_span(
        &mut self,
        _idx: usize,
        e: &Entity<'_>,
        wall: &WallFace<'_>,
        surf: &Surface<'_>,
        span: Span,
    ) {
        if let Some(img) = surf.img {
            self.tex_column(wall, e.cur_iz, surf, img, span);
        }
    }
}

/// Remembers the last run that covers pixel `(qx, qy)`.
///
/// Runs arrive front-to-back for opaque bands and back-to-front for
/// sprites, so the last hit is the nearest visible object. Rails are not
/// pickable.
#[derive(Debug)]
pub struct Pick {
    pub qx: i32,
    pub qy: i32,
    pub hit: Option<(usize, Part)>,
}

impl Pick {
    pub fn new(qx: i32, qy: i32) -> Self {
        Self { qx, qy, hit: None }
    }

    fn record(&mut self, idx: usize, part: Part, span: Span) {
        if span.x == self.qx && span.contains_row(self.qy) {
            trace!("pick: entity {idx} {part:?} covers ({}, {})", self.qx, self.qy);
            self.hit = Some((idx, part));
        }
    }
}

impl ColumnSink for Pick {
    fn only_column(&self) -> Option<i32> {
        Some(self.qx)
    }

    fn wall_span(
        &mut self,
        idx: usize,
        _e: &Entity<'_>,
        _wall: &WallFace<'_>,
        _surf: &Surface<'_>,
        part: Part,
        span: Span,
    ) {
        self.record(idx, part, span);
    }

    fn sprite_span(&mut self, idx: usize, _e: &Entity<'_>, _sprite: &Billboard<'_>, span: Span) {
        self.record(idx, Part::Thing, span);
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
