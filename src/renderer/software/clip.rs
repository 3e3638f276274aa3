use log::trace;

use super::entity::Entity;

/// Drop entities hidden behind nearer one-sided walls in every column
/// they cover.
///
/// Only a rough pass: entities are ordered by mid-span depth and each
/// column keeps the nearest one-sided wall seen so far. Two-sided walls
/// and sprites never write the column buffer and are never dropped, as
/// gaps and see-through pixels can show what lies behind them.
pub fn clip_solids(walls: &mut Vec<Entity<'_>>, screen_w: i32) {
    // nearest first
    walls.sort_by(|a, b| b.mid_iz.total_cmp(&a.mid_iz));

    let mut depth_x = vec![0.0f64; screen_w.max(0) as usize];
    let before = walls.len();

    walls.retain(|e| {
        let Some(wall) = e.wall() else {
            return true;
        };
        let one_sided = wall.one_sided();

        let mut vis_count = e.sx2 - e.sx1 + 1;
        for x in e.sx1..=e.sx2 {
            let Some(depth) = depth_x.get_mut(x as usize) else {
                continue;
            };
            let iz = e.iz_at(x);
            if iz < *depth {
                vis_count -= 1;
            } else if one_sided {
                *depth = iz;
            }
        }

        vis_count > 0 || !one_sided
    });

    trace!("clip_solids: kept {} of {} entities", walls.len(), before);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        defs::ThingFlags,
        renderer::software::{
            entity::{Billboard, Body, WallFace},
            surface::WallSurfaces,
        },
        world::{Image, Side},
    };
    use glam::Vec2;

    fn entity<'a>(sx1: i32, sx2: i32, iz: f64, body: Body<'a>) -> Entity<'a> {
        Entity {
            sx1,
            sx2,
            iz1: iz,
            iz2: iz,
            diz: 0.0,
            cur_iz: iz,
            mid_iz: iz,
            oy1: 0,
            oy2: 99,
            body,
        }
    }

    fn face(line: u16, back_sector: Option<u16>) -> Body<'static> {
        Body::Wall(WallFace {
            line,
            side: Side::Right,
            sidedef: 0,
            sector: 0,
            back_sector,
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
            surf: WallSurfaces::default(),
        })
    }

    fn line_of(e: &Entity<'_>) -> Option<u16> {
        e.wall().map(|w| w.line)
    }

    #[test]
    fn hidden_one_sided_walls_are_dropped() {
        let mut walls = vec![
            entity(0, 99, 0.001, face(1, None)),
            entity(0, 99, 0.01, face(0, None)),
            // pokes out past the near wall
            entity(90, 119, 0.002, face(2, None)),
        ];
        clip_solids(&mut walls, 120);

        let kept: Vec<_> = walls.iter().filter_map(line_of).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn two_sided_walls_and_sprites_survive() {
        let img = Image::default();
        let sprite = Body::Sprite(Billboard {
            thing: 0,
            pos: Vec2::ZERO,
            flags: ThingFlags::empty(),
            tx1: 0.0,
            scale: 1.0,
            light: 255,
            img: &img,
            h1: 0,
            h2: 8,
        });
        let mut walls = vec![
            entity(0, 99, 0.01, face(0, None)),
            entity(10, 20, 0.001, face(1, Some(1))),
            entity(30, 40, 0.001, sprite),
        ];
        clip_solids(&mut walls, 100);

        assert_eq!(walls.len(), 3);
        assert_eq!(walls.iter().filter(|e| e.sprite().is_some()).count(), 1);
    }

    #[test]
    fn two_sided_walls_do_not_occlude() {
        let mut walls = vec![
            entity(0, 99, 0.01, face(0, Some(1))),
            entity(0, 99, 0.001, face(1, None)),
        ];
        clip_solids(&mut walls, 100);
        assert_eq!(walls.len(), 2);
    }
}
