//! Sector light + distance → colormap row.

use crate::world::NUM_LIGHT_MAPS;

/// Colormap row for a surface of `light` (0..=255) seen at `dist`.
///
/// Closer surfaces are brighter; the darkest row a surface can reach
/// depends on how bright its sector is.
#[inline]
pub fn light_index(light: i32, dist: f32) -> usize {
    let max_l = NUM_LIGHT_MAPS as i32 - 1;
    let l = light >> 2;
    let min_l = (36 - l).clamp(0, max_l);

    let idx = (59 - l) - (1280.0 / dist.max(1.0)) as i32;
    idx.clamp(min_l, max_l) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brighter_when_closer() {
        let near = light_index(160, 40.0);
        let far = light_index(160, 2000.0);
        assert!(near < far);
        assert_eq!(near, 0);
        assert_eq!(far, 19);
    }

    #[test]
    fn bright_sectors_reach_row_zero() {
        assert_eq!(light_index(255, 1.0), 0);
        // a dark room never gets brighter than its floor
        assert_eq!(light_index(64, 1.0), 20);
    }

    #[test]
    fn zero_distance_does_not_blow_up() {
        assert_eq!(light_index(255, 0.0), light_index(255, 1.0));
        assert_eq!(light_index(0, -5.0), 31);
    }
}
