use crate::{
    renderer::{Rgba, View},
    world::{Palette, Pixel},
};

/// Decode the palette-indexed `screen` into `out` (`out_w * out_h`).
///
/// In low detail every screen pixel becomes a 2×2 block, trimmed at the
/// right / bottom edge when the output size is odd.
pub fn blit(view: &View, palette: &Palette, screen: &[Pixel], out: &mut [Rgba]) {
    if view.out_w == 0 || view.out_h == 0 {
        return;
    }
    if view.options.high_detail {
        blit_hires(view, palette, screen, out);
    } else {
        blit_lores(view, palette, screen, out);
    }
}

fn blit_hires(view: &View, palette: &Palette, screen: &[Pixel], out: &mut [Rgba]) {
    let sw = view.screen_w as usize;
    let w = sw.min(view.out_w);

    for (src, dst) in screen
        .chunks_exact(sw)
        .zip(out.chunks_exact_mut(view.out_w))
        .take(view.out_h)
    {
        for (d, &s) in dst[..w].iter_mut().zip(&src[..w]) {
            *d = palette[s as usize];
        }
    }
}

fn blit_lores(view: &View, palette: &Palette, screen: &[Pixel], out: &mut [Rgba]) {
    let sw = view.screen_w as usize;
    let (ow, oh) = (view.out_w, view.out_h);

    for (ry, src) in screen.chunks_exact(sw).enumerate() {
        for oy in [ry * 2, ry * 2 + 1] {
            if oy >= oh {
                break;
            }
            let Some(dst) = out.get_mut(oy * ow..(oy + 1) * ow) else {
                return;
            };
            for (ox, d) in dst.iter_mut().enumerate() {
                if let Some(&s) = src.get(ox / 2) {
                    *d = palette[s as usize];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{GameColors, RenderOptions};
    use crate::world::Camera;
    use glam::Vec3;

    fn view(w: usize, h: usize, high_detail: bool) -> View {
        let cam = Camera::new(Vec3::ZERO, 0.0);
        let options = RenderOptions {
            high_detail,
            ..RenderOptions::default()
        };
        View::new(&cam, w, h, options, GameColors::default())
    }

    fn palette() -> Palette {
        let mut pal = Palette::default();
        for i in 0..256 {
            pal[i] = 0x0001_0000 * i as u32;
        }
        pal
    }

    #[test]
    fn hires_is_one_to_one() {
        let v = view(3, 2, true);
        let screen = [1, 2, 3, 4, 5, 6];
        let mut out = vec![0; 6];
        blit(&v, &palette(), &screen, &mut out);
        assert_eq!(out, screen.iter().map(|&p| p as u32 * 0x1_0000).collect::<Vec<_>>());
    }

    #[test]
    fn zero_sized_output_is_a_no_op() {
        for high_detail in [true, false] {
            let v = view(0, 4, high_detail);
            let screen = [9];
            let mut out: Vec<u32> = Vec::new();
            blit(&v, &palette(), &screen, &mut out);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn lores_doubles_and_trims_odd_edges() {
        let v = view(3, 3, false);
        assert_eq!((v.screen_w, v.screen_h), (2, 2));
        let screen = [1, 2, 3, 4];
        let mut out = vec![0; 9];
        blit(&v, &palette(), &screen, &mut out);
        let rows: Vec<Vec<u32>> = out.chunks(3).map(|r| r.iter().map(|c| c >> 16).collect()).collect();
        assert_eq!(rows, vec![vec![1, 1, 2], vec![1, 1, 2], vec![3, 3, 4]]);
    }
}
