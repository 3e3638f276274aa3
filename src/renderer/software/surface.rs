//! Which vertical bands of a wall are visible, and what fills them.

use bitflags::bitflags;

use crate::{
    renderer::View,
    world::{AssetQuery, Image, Linedef, LinedefFlags, Pixel, Sector, Sidedef, is_null_tex},
};

/// Stand-ins for "up to the sky" / "down to the abyss" in band heights.
pub const FAR_UP: i32 = 99_999;
pub const FAR_DOWN: i32 = -99_999;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfKind {
    #[default]
    Invis,
    Flat,
    Texture,
}

bitflags! {
    /// Edges of a band that nothing further away can be seen through.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SolidEdges: u8 {
        const ABOVE = 0x01;
        const BELOW = 0x02;
    }
}

/// One drawable band of a wall, or a sprite billboard.
#[derive(Clone, Debug, Default)]
pub struct Surface<'a> {
    pub kind: SurfKind,
    /// world heights, `h1 <= h2`
    pub h1: i32,
    pub h2: i32,
    /// height the texture's top row is anchored to
    pub tex_h: i32,
    /// `None` draws the solid colour `col`
    pub img: Option<&'a Image>,
    pub col: Pixel,
    pub solid: SolidEdges,
    pub fullbright: bool,
}

/// Colour in `range` picked from a hash of `name`, stable across frames.
pub fn hashed_color(name: &str, range: [Pixel; 2]) -> Pixel {
    if is_null_tex(name) {
        return range[0];
    }
    let hash = name.bytes().fold(0u32, |h, b| {
        h.wrapping_mul(31).wrapping_add(b.to_ascii_uppercase() as u32)
    });
    let lo = range[0].min(range[1]);
    let span = range[0].abs_diff(range[1]) as u32 + 1;
    lo + (hash % span) as Pixel
}

impl<'a> Surface<'a> {
    pub fn find_flat(&mut self, name: &str, view: &View, assets: &'a dyn AssetQuery) {
        self.fullbright = false;

        if view.colors.is_sky(name) {
            self.col = view.colors.sky_color;
            self.fullbright = true;
            return;
        }

        if view.options.texturing {
            match assets.flat(name) {
                Some(img) => self.img = Some(img),
                None => {
                    self.img = Some(assets.unknown_flat());
                    self.fullbright = view.options.unknown_bright;
                }
            }
            return;
        }

        // when lighting and no texturing, use a single color
        self.col = if view.options.lighting {
            view.colors.floor_colors[1]
        } else {
            hashed_color(name, view.colors.floor_colors)
        };
    }

    pub fn find_tex(&mut self, name: &str, view: &View, assets: &'a dyn AssetQuery) {
        self.fullbright = false;

        if view.options.texturing {
            if is_null_tex(name) {
                self.img = Some(assets.missing_texture());
                self.fullbright = view.options.missing_bright;
                return;
            }
            match assets.texture(name) {
                Some(img) => self.img = Some(img),
                None => {
                    self.img = Some(assets.unknown_texture());
                    self.fullbright = view.options.unknown_bright;
                }
            }
            return;
        }

        self.col = if view.options.lighting {
            view.colors.wall_colors[1]
        } else {
            hashed_color(name, view.colors.wall_colors)
        };
    }

    #[inline]
    fn img_height(&self) -> Option<i32> {
        self.img.map(|img| img.h as i32)
    }
}

/// The five bands a wall face can show.
#[derive(Clone, Debug, Default)]
pub struct WallSurfaces<'a> {
    pub ceil: Surface<'a>,
    pub upper: Surface<'a>,
    pub lower: Surface<'a>,
    pub floor: Surface<'a>,
    pub rail: Surface<'a>,
}

/// Inputs for resolving one facing side of a linedef.
pub struct WallContext<'m> {
    pub line: &'m Linedef,
    pub side: &'m Sidedef,
    pub front: &'m Sector,
    pub back: Option<&'m Sector>,
    /// front and back are the very same sector
    pub self_ref: bool,
}

impl<'a> WallSurfaces<'a> {
    pub fn resolve(ctx: &WallContext<'_>, view: &View, assets: &'a dyn AssetQuery) -> Self {
        let mut s = WallSurfaces::default();
        let WallContext {
            line,
            side: sd,
            front,
            back,
            self_ref,
        } = *ctx;

        let sky_upper = back.is_some_and(|back| {
            view.colors.is_sky(&front.ceil_tex) && view.colors.is_sky(&back.ceil_tex)
        });

        if (front.ceil_h as f32 > view.z || view.colors.is_sky(&front.ceil_tex))
            && !sky_upper
            && !self_ref
        {
            s.ceil.kind = SurfKind::Flat;
            s.ceil.h1 = front.ceil_h;
            s.ceil.h2 = FAR_UP;
            s.ceil.tex_h = s.ceil.h1;
            s.ceil.solid = SolidEdges::ABOVE;
            s.ceil.find_flat(&front.ceil_tex, view, assets);
        }

        if (front.floor_h as f32) < view.z && !self_ref {
            s.floor.kind = SurfKind::Flat;
            s.floor.h1 = FAR_DOWN;
            s.floor.h2 = front.floor_h;
            s.floor.tex_h = s.floor.h2;
            s.floor.solid = SolidEdges::BELOW;
            s.floor.find_flat(&front.floor_tex, view, assets);
        }

        let Some(back) = back else {
            /* ONE-sided line */
            let lower = &mut s.lower;
            lower.kind = SurfKind::Texture;
            lower.h1 = front.floor_h;
            lower.h2 = front.ceil_h;
            lower.solid = SolidEdges::ABOVE | SolidEdges::BELOW;
            lower.find_tex(&sd.middle, view, assets);

            lower.tex_h = match lower.img_height() {
                Some(h) if line.flags.contains(LinedefFlags::LOWER_UNPEGGED) => lower.h1 + h,
                _ => lower.h2,
            };
            lower.tex_h += sd.y_off;
            return s;
        };

        /* TWO-sided line */

        if back.ceil_h < front.ceil_h && !sky_upper && !self_ref {
            let upper = &mut s.upper;
            upper.kind = SurfKind::Texture;
            upper.h1 = back.ceil_h;
            upper.h2 = front.ceil_h;
            upper.solid = SolidEdges::ABOVE;
            upper.find_tex(&sd.upper, view, assets);

            upper.tex_h = match upper.img_height() {
                Some(h) if !line.flags.contains(LinedefFlags::UPPER_UNPEGGED) => upper.h1 + h,
                _ => upper.h2,
            };
            upper.tex_h += sd.y_off;
        }

        if back.floor_h > front.floor_h && !self_ref {
            let lower = &mut s.lower;
            lower.kind = SurfKind::Texture;
            lower.h1 = front.floor_h;
            lower.h2 = back.floor_h;
            lower.solid = SolidEdges::BELOW;
            lower.find_tex(&sd.lower, view, assets);

            // a sky upper anchors to the far ceiling, like DOOM does
            lower.tex_h = if line.flags.contains(LinedefFlags::LOWER_UNPEGGED) {
                if sky_upper { back.ceil_h } else { front.ceil_h }
            } else {
                lower.h2
            };
            lower.tex_h += sd.y_off;
        }

        /* Mid-Masked texture */

        if !view.options.texturing || is_null_tex(&sd.middle) {
            return s;
        }

        let rail = &mut s.rail;
        rail.find_tex(&sd.middle, view, assets);
        let Some(r_h) = rail.img_height() else {
            return s;
        };

        let c_h = front.ceil_h.min(back.ceil_h);
        let f_h = front.floor_h.max(back.floor_h);

        if f_h >= c_h {
            return s;
        }

        if line.flags.contains(LinedefFlags::LOWER_UNPEGGED) {
            rail.h1 = f_h + sd.y_off;
            rail.h2 = rail.h1 + r_h;
        } else {
            rail.h2 = c_h + sd.y_off;
            rail.h1 = rail.h2 - r_h;
        }

        rail.kind = SurfKind::Texture;
        rail.solid = SolidEdges::empty();
        rail.tex_h = rail.h2;

        // clip railing, unless sectors on both sides are identical or
        // we have a sky upper
        let same_ceil = back.ceil_h == front.ceil_h
            && back.ceil_tex == front.ceil_tex
            && back.light == front.light;
        if !(sky_upper || same_ceil) {
            rail.h2 = rail.h2.min(c_h);
        }

        let same_floor = back.floor_h == front.floor_h
            && back.floor_tex == front.floor_tex
            && back.light == front.light;
        if !same_floor {
            rail.h1 = rail.h1.max(f_h);
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{GameColors, RenderOptions};
    use crate::world::{Camera, TextureBank};
    use glam::Vec3;

    fn view_at(z: f32) -> View {
        let cam = Camera::new(Vec3::new(0.0, 0.0, z), 0.0);
        View::new(&cam, 64, 64, RenderOptions::default(), GameColors::default())
    }

    fn bank() -> TextureBank {
        let mut bank = TextureBank::default_with_checker();
        bank.insert_texture("STARTAN", Image::solid("STARTAN", 64, 128, 40)).unwrap();
        bank.insert_texture("RAIL", Image::solid("RAIL", 64, 32, 41)).unwrap();
        bank.insert_flat("FLOOR", Image::solid("FLOOR", 64, 64, 42)).unwrap();
        bank
    }

    fn sector(floor_h: i32, ceil_h: i32, ceil_tex: &str, light: i32) -> Sector {
        Sector {
            floor_h,
            ceil_h,
            floor_tex: "FLOOR".into(),
            ceil_tex: ceil_tex.into(),
            light,
        }
    }

    fn side(upper: &str, middle: &str, lower: &str) -> Sidedef {
        Sidedef {
            x_off: 0,
            y_off: 0,
            upper: upper.into(),
            lower: lower.into(),
            middle: middle.into(),
            sector: 0,
        }
    }

    fn line(flags: LinedefFlags) -> Linedef {
        Linedef {
            v1: 0,
            v2: 1,
            flags,
            right_sidedef: Some(0),
            left_sidedef: Some(1),
        }
    }

    fn resolve<'a>(
        ld: &Linedef,
        sd: &Sidedef,
        front: &Sector,
        back: Option<&Sector>,
        view: &View,
        bank: &'a TextureBank,
    ) -> WallSurfaces<'a> {
        let ctx = WallContext {
            line: ld,
            side: sd,
            front,
            back,
            self_ref: false,
        };
        WallSurfaces::resolve(&ctx, view, bank)
    }

    #[test]
    fn one_sided_wall_is_a_full_height_lower() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "CEIL", 160);
        let sd = side("-", "STARTAN", "-");
        let s = resolve(&line(LinedefFlags::empty()), &sd, &front, None, &view, &bank);

        assert_eq!(s.lower.kind, SurfKind::Texture);
        assert_eq!((s.lower.h1, s.lower.h2), (0, 128));
        assert_eq!(s.lower.solid, SolidEdges::ABOVE | SolidEdges::BELOW);
        assert_eq!(s.lower.tex_h, 128);
        assert_eq!(s.upper.kind, SurfKind::Invis);
        assert_eq!(s.ceil.kind, SurfKind::Flat);
        assert_eq!(s.floor.kind, SurfKind::Flat);
    }

    #[test]
    fn lower_unpegged_one_sided_anchors_to_floor() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 96, "CEIL", 160);
        let mut sd = side("-", "STARTAN", "-");
        sd.y_off = 8;
        let s = resolve(&line(LinedefFlags::LOWER_UNPEGGED), &sd, &front, None, &view, &bank);
        // texture is 128 tall, so its top row sits 128 above the floor
        assert_eq!(s.lower.tex_h, 128 + 8);
    }

    #[test]
    fn identical_ceilings_make_no_upper() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "CEIL", 160);
        let back = sector(24, 128, "CEIL", 160);
        let sd = side("STARTAN", "-", "STARTAN");
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);

        assert_eq!(s.upper.kind, SurfKind::Invis);
        assert_eq!(s.lower.kind, SurfKind::Texture);
        assert_eq!((s.lower.h1, s.lower.h2), (0, 24));
        assert_eq!(s.lower.solid, SolidEdges::BELOW);
    }

    #[test]
    fn sky_over_sky_never_draws_upper_or_ceiling() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 256, "F_SKY1", 160);
        let back = sector(0, 128, "F_SKY1", 160);
        let sd = side("STARTAN", "-", "-");
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);

        assert_eq!(s.upper.kind, SurfKind::Invis);
        assert_eq!(s.ceil.kind, SurfKind::Invis);
    }

    #[test]
    fn upper_band_pegging() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 160, "CEIL", 160);
        let back = sector(0, 96, "CEIL", 160);
        let sd = side("STARTAN", "-", "-");

        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);
        assert_eq!((s.upper.h1, s.upper.h2), (96, 160));
        assert_eq!(s.upper.tex_h, 96 + 128);

        let s = resolve(
            &line(LinedefFlags::TWO_SIDED | LinedefFlags::UPPER_UNPEGGED),
            &sd,
            &front,
            Some(&back),
            &view,
            &bank,
        );
        assert_eq!(s.upper.tex_h, 160);
    }

    #[test]
    fn rail_is_clipped_to_the_opening() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "CEIL", 160);
        let back = sector(16, 112, "CEIL", 160);
        let sd = side("-", "RAIL", "-");
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);

        assert_eq!(s.rail.kind, SurfKind::Texture);
        assert_eq!((s.rail.h1, s.rail.h2), (112 - 32, 112));
        assert!(s.rail.solid.is_empty());

        let s = resolve(
            &line(LinedefFlags::TWO_SIDED | LinedefFlags::LOWER_UNPEGGED),
            &sd,
            &front,
            Some(&back),
            &view,
            &bank,
        );
        assert_eq!((s.rail.h1, s.rail.h2), (16, 16 + 32));
    }

    #[test]
    fn two_sided_lower_band_pegging() {
        let bank = bank();
        let view = view_at(41.0);
        let sd = side("-", "-", "STARTAN");
        let unpegged = line(LinedefFlags::TWO_SIDED | LinedefFlags::LOWER_UNPEGGED);

        let front = sector(0, 160, "CEIL", 160);
        let back = sector(24, 128, "CEIL", 160);

        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);
        assert_eq!((s.lower.h1, s.lower.h2), (0, 24));
        assert_eq!(s.lower.tex_h, 24);

        // unpegged lowers line up with the front ceiling
        let s = resolve(&unpegged, &sd, &front, Some(&back), &view, &bank);
        assert_eq!(s.lower.tex_h, 160);

        // under a sky upper they line up with the back ceiling instead
        let front = sector(0, 256, "F_SKY1", 160);
        let back = sector(24, 128, "F_SKY1", 160);
        let s = resolve(&unpegged, &sd, &front, Some(&back), &view, &bank);
        assert_eq!(s.lower.tex_h, 128);

        let mut offset = sd.clone();
        offset.y_off = 5;
        let s = resolve(&unpegged, &offset, &front, Some(&back), &view, &bank);
        assert_eq!(s.lower.tex_h, 128 + 5);
    }

    #[test]
    fn rail_between_identical_sectors_is_not_clipped() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "CEIL", 160);
        let back = sector(0, 128, "CEIL", 160);

        let mut sd = side("-", "RAIL", "-");
        sd.y_off = 8;
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);
        // top pokes 8 above the shared ceiling
        assert_eq!((s.rail.h1, s.rail.h2), (128 + 8 - 32, 128 + 8));

        sd.y_off = -8;
        let s = resolve(
            &line(LinedefFlags::TWO_SIDED | LinedefFlags::LOWER_UNPEGGED),
            &sd,
            &front,
            Some(&back),
            &view,
            &bank,
        );
        // bottom sinks 8 below the shared floor
        assert_eq!((s.rail.h1, s.rail.h2), (-8, -8 + 32));

        // a different light makes the sectors distinct again
        let dim = sector(0, 128, "CEIL", 96);
        let s = resolve(
            &line(LinedefFlags::TWO_SIDED | LinedefFlags::LOWER_UNPEGGED),
            &sd,
            &front,
            Some(&dim),
            &view,
            &bank,
        );
        assert_eq!(s.rail.h1, 0);
    }

    #[test]
    fn rail_under_a_sky_upper_is_not_clipped_at_the_top() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "F_SKY1", 160);
        let back = sector(16, 112, "F_SKY1", 200);

        let mut sd = side("-", "RAIL", "-");
        sd.y_off = 8;
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);
        assert_eq!((s.rail.h1, s.rail.h2), (112 + 8 - 32, 112 + 8));
        assert!(s.rail.h2 > 112);

        // the same heights without sky are clipped to the opening
        let front = sector(0, 128, "CEIL", 160);
        let back = sector(16, 112, "CEIL", 200);
        let s = resolve(&line(LinedefFlags::TWO_SIDED), &sd, &front, Some(&back), &view, &bank);
        assert_eq!(s.rail.h2, 112);
    }

    #[test]
    fn missing_and_unknown_names_use_bright_placeholders() {
        let bank = bank();
        let view = view_at(41.0);
        let front = sector(0, 128, "NOSUCHFLAT", 160);

        let sd = side("-", "-", "-");
        let s = resolve(&line(LinedefFlags::empty()), &sd, &front, None, &view, &bank);
        assert_eq!(s.lower.img.map(|i| i.name.as_str()), Some("MISSING"));
        assert!(s.lower.fullbright);
        assert_eq!(s.ceil.img.map(|i| i.name.as_str()), Some("UNKNFLAT"));
        assert!(s.ceil.fullbright);

        let sd = side("-", "NOSUCHTEX", "-");
        let s = resolve(&line(LinedefFlags::empty()), &sd, &front, None, &view, &bank);
        assert_eq!(s.lower.img.map(|i| i.name.as_str()), Some("UNKNOWN"));
        assert!(s.lower.fullbright);
    }

    #[test]
    fn untextured_mode_uses_colours() {
        let bank = bank();
        let mut view = view_at(41.0);
        view.options.texturing = false;
        let front = sector(0, 128, "CEIL", 160);
        let sd = side("-", "STARTAN", "-");
        let s = resolve(&line(LinedefFlags::empty()), &sd, &front, None, &view, &bank);
        assert!(s.lower.img.is_none());
        assert_eq!(s.lower.col, view.colors.wall_colors[1]);

        view.options.lighting = false;
        let s = resolve(&line(LinedefFlags::empty()), &sd, &front, None, &view, &bank);
        let [a, b] = view.colors.wall_colors;
        assert!((a..=b).contains(&s.lower.col));
        assert_eq!(s.lower.col, hashed_color("STARTAN", view.colors.wall_colors));
    }
}
