use log::trace;

use super::{
    Frame,
    compositor::Compositor,
    entity::{Body, Entity},
    sink::Pick,
};
use crate::{
    renderer::{Obj3d, Part, View},
    world::{AssetQuery, MapGeometry},
};

/// Object under internal screen pixel `(qx, qy)`.
///
/// Runs the whole pipeline for the single column `qx` with a [`Pick`]
/// sink instead of painting.
pub fn query(
    view: &View,
    map: &dyn MapGeometry,
    assets: &dyn AssetQuery,
    qx: i32,
    qy: i32,
) -> Option<Obj3d> {
    if !(0..view.screen_w).contains(&qx) || !(0..view.screen_h).contains(&qy) {
        return None;
    }

    let mut frame = Frame::build(view, map, assets, None, Some(qx));
    let mut pick = Pick::new(qx, qy);
    Compositor::new(view).sweep(&mut frame.walls, &mut pick);

    let (idx, part) = pick.hit?;
    let obj = frame.walls.get(idx).map(|e| object_of(e, part))?;

    if !obj.is_valid(map) {
        return None;
    }
    trace!("query ({qx}, {qy}) -> {obj:?}");
    Some(obj)
}

/// Map object an entity band belongs to.
fn object_of(e: &Entity<'_>, part: Part) -> Obj3d {
    match &e.body {
        Body::Sprite(s) => Obj3d::Thing(s.thing),
        Body::Wall(w) => match part {
            Part::Floor | Part::Ceil => Obj3d::Sector {
                sector: w.sector,
                part,
            },
            _ => Obj3d::Line {
                line: w.line,
                side: w.side,
                part,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{GameColors, RenderOptions};
    use crate::world::{Camera, LevelBuilder, Side, TextureBank};
    use glam::{Vec3, vec2};
    use std::f32::consts::FRAC_PI_2;

    fn view(w: usize, h: usize) -> View {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 64.0), FRAC_PI_2);
        View::new(&cam, w, h, RenderOptions::default(), GameColors::default())
    }

    #[test]
    fn centre_of_a_facing_wall_is_its_lower_band() {
        let mut b = LevelBuilder::new("Q");
        let s = b.sector(0, 128, "FLOOR", "CEIL", 160);
        let sd = b.side(s, "-", "STARTAN", "-");
        b.line((-1000.0, 100.0), (1000.0, 100.0), sd, None);
        let lvl = b.build().unwrap();
        let bank = TextureBank::default_with_checker();

        let v = view(320, 200);
        let hit = query(&v, &lvl, &bank, v.screen_w / 2, v.screen_h / 2);
        assert_eq!(
            hit,
            Some(Obj3d::Line {
                line: 0,
                side: Side::Right,
                part: Part::Lower
            })
        );
    }

    #[test]
    fn floor_ceiling_and_things() {
        let mut b = LevelBuilder::new("Q");
        let s = b.sector(0, 128, "FLOOR", "CEIL", 160);
        b.room(
            s,
            &[(-256.0, -256.0), (-256.0, 256.0), (256.0, 256.0), (256.0, -256.0)],
            "STARTAN",
        );
        b.thing(vec2(0.0, 128.0), 0, 3001);
        let lvl = b.build().unwrap();
        let bank = TextureBank::default_with_checker();

        let v = view(64, 64);
        // top and bottom rows see the ceiling and floor
        assert_eq!(
            query(&v, &lvl, &bank, 5, 0),
            Some(Obj3d::Sector { sector: s, part: Part::Ceil })
        );
        assert_eq!(
            query(&v, &lvl, &bank, 5, 63),
            Some(Obj3d::Sector { sector: s, part: Part::Floor })
        );
        // the unknown-sprite placeholder stands in the middle
        assert_eq!(query(&v, &lvl, &bank, 32, 46), Some(Obj3d::Thing(0)));
    }

    #[test]
    fn empty_map_and_out_of_range_queries_miss() {
        let lvl = LevelBuilder::new("EMPTY").build().unwrap();
        let bank = TextureBank::default_with_checker();
        let v = view(64, 64);
        assert_eq!(query(&v, &lvl, &bank, 10, 10), None);
        assert_eq!(query(&v, &lvl, &bank, -1, 10), None);
        assert_eq!(query(&v, &lvl, &bank, 10, 64), None);
    }
}
