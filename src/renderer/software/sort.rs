//! Front-to-back ordering of the active list.
//!
//! [`Entity::is_closer`] is *not* a strict weak ordering: the shared-vertex
//! and same-position rules can disagree with plain depth, so it must never
//! be handed to `slice::sort_by`. The quicksort below is written around
//! that comparator and around the active list being nearly sorted already
//! from the previous column.

use glam::Vec2;

use super::entity::{Body, Entity};
use crate::world::point_on_line_side;

impl<'a> Entity<'a> {
    /// Is `self` nearer to the camera at `cam` than `b`, in the current
    /// column?
    ///
    /// `cam` is the camera position truncated to whole map units.
    pub fn is_closer(&self, b: &Self, cam: Vec2) -> bool {
        if std::ptr::eq(self, b) {
            return false;
        }

        match (&self.body, &b.body) {
            (Body::Wall(wa), Body::Wall(wb)) => {
                // walls meeting at a vertex are where slime trails show up:
                // decide by which side of B the camera and A's far end lie
                let a_other = if wb.v1 == wa.v1 || wb.v2 == wa.v1 {
                    Some(wa.p2)
                } else if wb.v1 == wa.v2 || wb.v2 == wa.v2 {
                    Some(wa.p1)
                } else {
                    None
                };

                if let Some(a) = a_other {
                    let a_side = point_on_line_side(a, wb.p1, wb.p2);
                    let c_side = point_on_line_side(cam, wb.p1, wb.p2);
                    return a_side * c_side >= 0;
                }
            }
            (Body::Sprite(sa), Body::Sprite(sb)) => {
                // two things at the same spot would flicker
                if sa.pos == sb.pos {
                    return sa.thing > sb.thing;
                }
            }
            _ => {}
        }

        self.cur_iz > b.cur_iz
    }
}

/// Sorts indices into `walls` nearest-first.
pub struct ActiveSorter<'s, 'a> {
    walls: &'s [Entity<'a>],
    cam: Vec2,
}

impl<'s, 'a> ActiveSorter<'s, 'a> {
    pub fn new(walls: &'s [Entity<'a>], cam: Vec2) -> Self {
        Self {
            walls,
            cam: cam.trunc(),
        }
    }

    #[inline]
    fn closer(&self, i: usize, k: usize) -> bool {
        self.walls[i].is_closer(&self.walls[k], self.cam)
    }

    pub fn sort(&self, active: &mut [usize]) {
        if active.len() < 2 {
            return;
        }
        self.sort_range(active, 0, active.len() as isize - 1);
    }

    /// Hoare partition of `act[lo ..= hi]` around the entity at
    /// `pivot_idx`. Returns the last index of the "closer" half.
    fn partition(&self, act: &mut [usize], lo: isize, hi: isize, pivot_idx: isize) -> isize {
        let pivot = act[pivot_idx as usize];

        let mut s = lo;
        let mut e = hi;

        loop {
            while s <= e && self.closer(act[s as usize], pivot) {
                s += 1;
            }

            if s > hi {
                // everything was closer, pivot included
                if pivot_idx != hi {
                    act.swap(pivot_idx as usize, hi as usize);
                }
                return hi - 1;
            }

            while e >= s && !self.closer(act[e as usize], pivot) {
                e -= 1;
            }

            if e < lo {
                // nothing was closer
                if pivot_idx != lo {
                    act.swap(pivot_idx as usize, lo as usize);
                }
                return lo;
            }

            if s < e {
                act.swap(s as usize, e as usize);
                s += 1;
                e -= 1;
                continue;
            }

            return s - 1;
        }
    }

    fn sort_range(&self, act: &mut [usize], mut s: isize, mut e: isize) {
        while s < e {
            if s == e - 1 {
                if self.closer(act[e as usize], act[s as usize]) {
                    act.swap(s as usize, e as usize);
                }
                return;
            }

            // the list is usually nearly sorted, so the middle is a good pivot
            let pivot_idx = (s + e) >> 1;
            let mid = self.partition(act, s, e, pivot_idx);

            if mid <= s {
                s += 1;
                continue;
            } else if mid + 1 >= e {
                e -= 1;
                continue;
            }

            // recurse into the smaller half only
            if mid - s < e - mid {
                self.sort_range(act, s, mid);
                s = mid + 1;
            } else {
                self.sort_range(act, mid + 1, e);
                e = mid;
            }
        }
    }
}
