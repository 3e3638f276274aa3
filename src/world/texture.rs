// Format-agnostic repository of images decoded by the asset loader.
// The renderer interacts with it through the `AssetQuery` trait only.

use std::collections::HashMap;

use std::ops::{Index, IndexMut};

/// One palette-indexed pixel.
pub type Pixel = u8;

/// Palette index treated as see-through in wall, rail and sprite images.
pub const TRANS_PIXEL: Pixel = 247;

/// Number of light levels in a colormap (plus two special maps).
pub const NUM_LIGHT_MAPS: usize = 32;

/// CPU-side storage: palette indices in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Pixel>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Image {
    fn default() -> Self {
        Image::checker("CHECKER", 8, 8, 8)
    }
}

impl Image {
    /// Checkerboard of `light` and `light + 8` in `cell`-sized squares.
    pub fn checker(name: &str, w: usize, h: usize, light: Pixel) -> Self {
        let cell = (w.min(h) / 2).max(1);
        let dark = light.wrapping_add(8);
        let mut pixels = vec![0; w * h];
        for y in 0..h {
            for x in 0..w {
                pixels[y * w + x] = if ((x / cell) ^ (y / cell)) & 1 == 0 {
                    light
                } else {
                    dark
                };
            }
        }
        Image {
            name: name.to_string(),
            w,
            h,
            pixels,
        }
    }

    /// Single-colour image.
    pub fn solid(name: &str, w: usize, h: usize, colour: Pixel) -> Self {
        Image {
            name: name.to_string(),
            w,
            h,
            pixels: vec![colour; w * h],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.w + x]
    }
}

/// Things that can go wrong when filling the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second image with an existing name.
    #[error("{kind} `{name}` already present in bank")]
    Duplicate { kind: &'static str, name: String },

    /// Pixel vector does not match the declared dimensions.
    #[error("image `{name}` is {w}x{h} but carries {len} pixels")]
    BadSize {
        name: String,
        w: usize,
        h: usize,
        len: usize,
    },
}

pub struct Palette(pub [u32; 256]);
impl Default for Palette {
    fn default() -> Self {
        Palette([0u32; 256])
    }
}
impl Index<usize> for Palette {
    type Output = u32;
    fn index(&self, idx: usize) -> &u32 {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut u32 {
        &mut self.0[idx]
    }
}

impl Palette {
    /// 16 ramps of 16 shades (brightest first), 0x00RRGGBB.
    ///
    /// Ramp 0 is grey, so index 0 is white and index 15 near-black.
    pub fn ramps() -> Self {
        const HUES: [(u32, u32, u32); 16] = [
            (255, 255, 255),
            (255, 96, 96),
            (255, 176, 96),
            (255, 255, 96),
            (128, 255, 96),
            (96, 255, 176),
            (96, 255, 255),
            (96, 176, 255),
            (96, 96, 255),
            (176, 96, 255),
            (255, 96, 255),
            (200, 160, 120),
            (160, 120, 80),
            (120, 160, 120),
            (160, 160, 200),
            (224, 200, 160),
        ];
        let mut pal = Palette::default();
        for (ramp, &(r, g, b)) in HUES.iter().enumerate() {
            for shade in 0..16u32 {
                let k = 16 - shade;
                pal[ramp * 16 + shade as usize] = ((r * k / 16) << 16) | ((g * k / 16) << 8) | (b * k / 16);
            }
        }
        pal
    }

    /// Palette index whose colour is closest to `rgb`.
    pub fn nearest(&self, rgb: u32) -> Pixel {
        let split = |c: u32| ((c >> 16) as i32 & 0xFF, (c >> 8) as i32 & 0xFF, c as i32 & 0xFF);
        let (r, g, b) = split(rgb);
        let mut best = (i32::MAX, 0usize);
        for (i, &c) in self.0.iter().enumerate() {
            let (pr, pg, pb) = split(c);
            let d = (pr - r).pow(2) + (pg - g).pow(2) + (pb - b).pow(2);
            if d < best.0 {
                best = (d, i);
            }
        }
        best.1 as Pixel
    }
}

pub struct Colormap(pub [[u8; 256]; 34]);
impl Default for Colormap {
    fn default() -> Self {
        Colormap([[0u8; 256]; 34])
    }
}
impl Index<usize> for Colormap {
    type Output = [u8; 256];
    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Colormap {
    fn index_mut(&mut self, idx: usize) -> &mut [u8; 256] {
        &mut self.0[idx]
    }
}

impl Colormap {
    /// Build the 32 fade levels by nearest-colour matching against
    /// `palette`; map 32 is greyscale, map 33 all black.
    pub fn from_palette(palette: &Palette) -> Self {
        let mut cm = Colormap::default();
        for level in 0..NUM_LIGHT_MAPS {
            let k = (NUM_LIGHT_MAPS - level) as u32;
            for idx in 0..256 {
                let c = palette[idx];
                let r = ((c >> 16) & 0xFF) * k / NUM_LIGHT_MAPS as u32;
                let g = ((c >> 8) & 0xFF) * k / NUM_LIGHT_MAPS as u32;
                let b = (c & 0xFF) * k / NUM_LIGHT_MAPS as u32;
                cm[level][idx] = palette.nearest((r << 16) | (g << 8) | b);
            }
        }
        for idx in 0..256 {
            let c = palette[idx];
            let lum = (((c >> 16) & 0xFF) * 3 + ((c >> 8) & 0xFF) * 6 + (c & 0xFF)) / 10;
            cm[32][idx] = palette.nearest(0x01_01_01 * (255 - lum));
            cm[33][idx] = palette.nearest(0);
        }
        cm
    }
}

/// An empty or `-` texture name means "no texture here".
#[inline]
pub fn is_null_tex(name: &str) -> bool {
    name.is_empty() || name.starts_with('-')
}

/// Image and colour lookups the renderer needs from the asset owner.
pub trait AssetQuery {
    fn texture(&self, name: &str) -> Option<&Image>;
    fn flat(&self, name: &str) -> Option<&Image>;
    fn sprite(&self, name: &str) -> Option<&Image>;

    /// Drawn where a wall needs a texture but names none.
    fn missing_texture(&self) -> &Image;
    /// Drawn where a wall names a texture the bank does not have.
    fn unknown_texture(&self) -> &Image;
    fn unknown_flat(&self) -> &Image;
    fn unknown_sprite(&self) -> &Image;

    fn palette(&self) -> &Palette;
    fn colormap(&self) -> &Colormap;
}

/// A palette-agnostic cache of wall textures, flats and sprites.
///
/// * Does **not** know about WADs or PNGs; the loader decodes those.
/// * Stores exactly one copy of every name per namespace.
/// * Placeholder images are always present.
pub struct TextureBank {
    textures: HashMap<String, Image>,
    flats: HashMap<String, Image>,
    sprites: HashMap<String, Image>,
    missing_tex: Image,
    unknown_tex: Image,
    unknown_flat: Image,
    unknown_sprite: Image,
    palette: Palette,
    colormap: Colormap,
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::default_with_checker()
    }
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Bank with checkerboard placeholders and the built-in ramp palette.
    pub fn default_with_checker() -> Self {
        let palette = Palette::ramps();
        let colormap = Colormap::from_palette(&palette);
        Self {
            textures: HashMap::new(),
            flats: HashMap::new(),
            sprites: HashMap::new(),
            missing_tex: Image::checker("MISSING", 64, 64, 1 * 16 + 2),
            unknown_tex: Image::checker("UNKNOWN", 64, 64, 10 * 16 + 2),
            unknown_flat: Image::checker("UNKNFLAT", 64, 64, 6 * 16 + 2),
            unknown_sprite: Image::checker("UNKNSPR", 16, 16, 3 * 16 + 2),
            palette,
            colormap,
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of named images stored (placeholders excluded).
    pub fn len(&self) -> usize {
        self.textures.len() + self.flats.len() + self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    pub fn insert_texture<S: Into<String>>(&mut self, name: S, img: Image) -> Result<(), TextureError> {
        Self::insert_into(&mut self.textures, "texture", name.into(), img)
    }

    pub fn insert_flat<S: Into<String>>(&mut self, name: S, img: Image) -> Result<(), TextureError> {
        Self::insert_into(&mut self.flats, "flat", name.into(), img)
    }

    pub fn insert_sprite<S: Into<String>>(&mut self, name: S, img: Image) -> Result<(), TextureError> {
        Self::insert_into(&mut self.sprites, "sprite", name.into(), img)
    }

    fn insert_into(
        map: &mut HashMap<String, Image>,
        kind: &'static str,
        name: String,
        img: Image,
    ) -> Result<(), TextureError> {
        if img.pixels.len() != img.w * img.h || img.w == 0 || img.h == 0 {
            return Err(TextureError::BadSize {
                name,
                w: img.w,
                h: img.h,
                len: img.pixels.len(),
            });
        }
        let key = name.to_ascii_uppercase();
        if map.contains_key(&key) {
            return Err(TextureError::Duplicate { kind, name });
        }
        map.insert(key, img);
        Ok(())
    }

    fn lookup<'a>(map: &'a HashMap<String, Image>, name: &str) -> Option<&'a Image> {
        map.get(name)
            .or_else(|| map.get(&name.to_ascii_uppercase()))
    }
}

impl AssetQuery for TextureBank {
    fn texture(&self, name: &str) -> Option<&Image> {
        Self::lookup(&self.textures, name)
    }

    fn flat(&self, name: &str) -> Option<&Image> {
        Self::lookup(&self.flats, name)
    }

    fn sprite(&self, name: &str) -> Option<&Image> {
        Self::lookup(&self.sprites, name)
    }

    fn missing_texture(&self) -> &Image {
        &self.missing_tex
    }

    fn unknown_texture(&self) -> &Image {
        &self.unknown_tex
    }

    fn unknown_flat(&self) -> &Image {
        &self.unknown_flat
    }

    fn unknown_sprite(&self) -> &Image {
        &self.unknown_sprite
    }

    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn colormap(&self) -> &Colormap {
        &self.colormap
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
