use super::{cross_2d, Point2};

/// Side of point `c` relative to the directed line `a → b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    On,
}

/// Classifies `c` against the line `a → b`; `eps` bounds twice the
/// triangle area treated as collinear.
#[must_use]
pub fn orient_2d(a: &Point2, b: &Point2, c: &Point2, eps: f64) -> Side {
    let cross = cross_2d(&(b - a), &(c - a));
    if cross > eps {
        Side::Left
    } else if cross < -eps {
        Side::Right
    } else {
        Side::On
    }
}

/// Returns `true` if the closed segments `a0-a1` and `b0-b1` share at least
/// one point, including endpoint contact and collinear overlap.
#[must_use]
pub fn segments_touch_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, eps: f64) -> bool {
    let o1 = orient_2d(a0, a1, b0, eps);
    let o2 = orient_2d(a0, a1, b1, eps);
    let o3 = orient_2d(b0, b1, a0, eps);
    let o4 = orient_2d(b0, b1, a1, eps);

    let straddles = |p: Side, q: Side| {
        matches!((p, q), (Side::Left, Side::Right) | (Side::Right, Side::Left))
    };
    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1 == Side::On && within_box(a0, a1, b0, eps))
        || (o2 == Side::On && within_box(a0, a1, b1, eps))
        || (o3 == Side::On && within_box(b0, b1, a0, eps))
        || (o4 == Side::On && within_box(b0, b1, a1, eps))
}

/// Returns `true` if two segments sharing the endpoint `shared` overlap
/// along a stretch of positive length (the ring doubles back).
#[must_use]
pub fn adjacent_segments_overlap(prev: &Point2, shared: &Point2, next: &Point2, eps: f64) -> bool {
    let d_in = shared - prev;
    let d_out = next - shared;
    cross_2d(&d_in, &d_out).abs() <= eps && d_in.dot(&d_out) < 0.0
}

/// Checks whether `p` lies inside the bounding box of segment `a-b`, padded
/// by `eps`.
fn within_box(a: &Point2, b: &Point2, p: &Point2, eps: f64) -> bool {
    p.x >= a.x.min(b.x) - eps
        && p.x <= a.x.max(b.x) + eps
        && p.y >= a.y.min(b.y) - eps
        && p.y <= a.y.max(b.y) + eps
}
