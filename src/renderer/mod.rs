//! Rendering abstraction layer.
//!
//! *The editor never touches the renderer's internals.* It refreshes a
//! [`View`] from its camera and settings, then asks a type implementing
//! [`Renderer`] to either draw the world into a frame-buffer or tell it
//! which map object lies under a screen position.
//!
//! * Everything the renderer reads comes in through arguments: the view,
//!   a [`MapGeometry`] and an [`AssetQuery`]. There is no global state.
//! * The only back-end today is [`software::Software`].

use crate::world::{AssetQuery, Camera, LinedefId, MapGeometry, Pixel, SectorId, Side, ThingId};

/// Pixel format of the output frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// User-facing switches of the 3D preview.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Draw textures and flats; otherwise solid colours.
    pub texturing: bool,
    /// Distance / sector-light shading.
    pub lighting: bool,
    /// Draw things as sprites.
    pub sprites: bool,
    /// Render at full output resolution instead of half.
    pub high_detail: bool,
    /// Draw the "missing texture" placeholder full-bright.
    pub missing_bright: bool,
    /// Draw unknown textures / flats / sprites full-bright.
    pub unknown_bright: bool,
    /// Width:height of one screen pixel.
    pub pixel_aspect: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            texturing: true,
            lighting: true,
            sprites: true,
            high_detail: true,
            missing_bright: true,
            unknown_bright: true,
            pixel_aspect: 1.0,
        }
    }
}

/// Palette choices that come from the game definition.
#[derive(Clone, Debug, PartialEq)]
pub struct GameColors {
    pub sky_flat: String,
    pub sky_color: Pixel,
    /// `[first, last]` of the untextured floor colour range.
    pub floor_colors: [Pixel; 2],
    /// `[first, last]` of the untextured wall colour range.
    pub wall_colors: [Pixel; 2],
}

impl Default for GameColors {
    fn default() -> Self {
        Self {
            sky_flat: "F_SKY1".to_string(),
            sky_color: 7 * 16 + 3,
            floor_colors: [12 * 16 + 2, 12 * 16 + 9],
            wall_colors: [11 * 16 + 2, 11 * 16 + 9],
        }
    }
}

impl GameColors {
    #[inline]
    pub fn is_sky(&self, flat: &str) -> bool {
        flat.eq_ignore_ascii_case(&self.sky_flat)
    }
}

/// Everything the renderer needs to know about the current view.
///
/// Refreshed by the caller before each render / query call. Screen sizes
/// are the *internal* resolution, which is half the output size when
/// `options.high_detail` is off.
#[derive(Clone, Debug)]
pub struct View {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub angle: f32,
    pub sin: f32,
    pub cos: f32,

    pub screen_w: i32,
    pub screen_h: i32,
    pub out_w: usize,
    pub out_h: usize,

    pub aspect_sw: f32,
    pub aspect_sh: f32,

    pub options: RenderOptions,
    pub colors: GameColors,
}

impl View {
    pub fn new(
        camera: &Camera,
        out_w: usize,
        out_h: usize,
        options: RenderOptions,
        colors: GameColors,
    ) -> Self {
        let (screen_w, screen_h) = if options.high_detail {
            (out_w, out_h)
        } else {
            (out_w.div_ceil(2), out_h.div_ceil(2))
        };
        let screen_w = screen_w.max(1) as i32;
        let screen_h = screen_h.max(1) as i32;
        let pos = camera.pos();
        let (sin, cos) = camera.yaw.sin_cos();
        let aspect_sw = screen_w as f32;
        let aspect_sh = aspect_sw / options.pixel_aspect.max(0.1);

        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            angle: camera.yaw,
            sin,
            cos,
            screen_w,
            screen_h,
            out_w,
            out_h,
            aspect_sw,
            aspect_sh,
            options,
            colors,
        }
    }

    /// Number of pixels in the internal screen.
    #[inline]
    pub fn screen_len(&self) -> usize {
        self.screen_w as usize * self.screen_h as usize
    }
}

/// Which part of a map object a pixel belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Ceil,
    Floor,
    Upper,
    Lower,
    Thing,
}

/// A pickable / highlightable object in the 3D view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Obj3d {
    Thing(ThingId),
    /// `part` is [`Part::Floor`] or [`Part::Ceil`].
    Sector { sector: SectorId, part: Part },
    /// `part` is [`Part::Upper`] or [`Part::Lower`].
    Line {
        line: LinedefId,
        side: Side,
        part: Part,
    },
}

impl Obj3d {
    pub fn part(&self) -> Part {
        match *self {
            Obj3d::Thing(_) => Part::Thing,
            Obj3d::Sector { part, .. } | Obj3d::Line { part, .. } => part,
        }
    }

    pub fn thing(&self) -> Option<ThingId> {
        match *self {
            Obj3d::Thing(th) => Some(th),
            _ => None,
        }
    }

    /// True when the reference points at something `map` actually has.
    pub fn is_valid(&self, map: &dyn MapGeometry) -> bool {
        match *self {
            Obj3d::Thing(th) => (th as usize) < map.things().len(),
            Obj3d::Sector { sector, .. } => (sector as usize) < map.sectors().len(),
            Obj3d::Line { line, .. } => (line as usize) < map.linedefs().len(),
        }
    }
}

/// Hovered and selected objects, outlined after drawing.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub hover: Option<Obj3d>,
    pub selected: Vec<Obj3d>,
}

impl Selection {
    /// Add `obj` when absent, remove it when present.
    pub fn toggle(&mut self, obj: Obj3d) {
        if let Some(i) = self.selected.iter().position(|o| *o == obj) {
            self.selected.remove(i);
        } else {
            self.selected.push(obj);
        }
    }
}

/// A 3D preview back-end.
pub trait Renderer {
    /// Draw the world seen from `view` into `out`
    /// (`view.out_w * view.out_h` pixels), then outline `selection`.
    fn render_world(
        &mut self,
        view: &View,
        map: &dyn MapGeometry,
        assets: &dyn AssetQuery,
        selection: &Selection,
        out: &mut [Rgba],
    );

    /// Object under output pixel `(qx, qy)`, if any.
    fn query_point(
        &mut self,
        view: &View,
        map: &dyn MapGeometry,
        assets: &dyn AssetQuery,
        qx: i32,
        qy: i32,
    ) -> Option<Obj3d>;
}

pub mod software;

pub use software::Software;
