use tracing::warn;

use crate::error::PolygonError;
use crate::math::intersect_2d::{adjacent_segments_overlap, segments_touch_2d};
use crate::math::polygon_2d::{bounding_diagonal, point_in_ring, signed_area};
use crate::math::{Point2, TOLERANCE};

/// Length and area tolerances scaled to the extent of `points`.
fn scaled_tolerances(points: &[Point2]) -> (f64, f64) {
    let scale = bounding_diagonal(points).max(1.0);
    let eps_len = TOLERANCE * scale;
    (eps_len, eps_len * scale)
}

/// Removes repeated vertices and checks a single ring in isolation.
///
/// Consecutive duplicates, including a closing vertex equal to the first,
/// are dropped before counting.
pub(super) fn clean_ring(index: usize, ring: Vec<Point2>) -> Result<Vec<Point2>, PolygonError> {
    if ring.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(PolygonError::NonFinite { ring: index });
    }

    let (eps_len, eps_area) = scaled_tolerances(&ring);
    let mut cleaned: Vec<Point2> = Vec::with_capacity(ring.len());
    for p in ring {
        if cleaned
            .last()
            .is_none_or(|last: &Point2| (p - *last).norm() > eps_len)
        {
            cleaned.push(p);
        }
    }
    while cleaned.len() > 1 {
        let (first, last) = (cleaned[0], cleaned[cleaned.len() - 1]);
        if (first - last).norm() > eps_len {
            break;
        }
        cleaned.pop();
    }

    if cleaned.len() < 3 {
        return Err(PolygonError::TooFewPoints {
            ring: index,
            count: cleaned.len(),
        });
    }
    if signed_area(&cleaned).abs() <= eps_area {
        return Err(PolygonError::ZeroArea { ring: index });
    }

    let n = cleaned.len();
    for i in 0..n {
        let prev = &cleaned[(i + n - 1) % n];
        let next = &cleaned[(i + 1) % n];
        if adjacent_segments_overlap(prev, &cleaned[i], next, eps_area) {
            warn!(ring = index, vertex = i, "Rejecting ring with spike");
            return Err(PolygonError::Spike {
                ring: index,
                vertex: i,
            });
        }
    }

    if let Some((first, second)) = find_self_intersection(&cleaned, eps_area) {
        warn!(ring = index, first, second, "Rejecting self-intersecting ring");
        return Err(PolygonError::SelfIntersection {
            ring: index,
            first,
            second,
        });
    }

    Ok(cleaned)
}

/// Returns the first pair of non-adjacent edges that touch.
fn find_self_intersection(ring: &[Point2], eps: f64) -> Option<(usize, usize)> {
    let n = ring.len();
    for i in 0..n {
        let (a0, a1) = (&ring[i], &ring[(i + 1) % n]);
        for j in (i + 2)..n {
            // Edge n-1 shares vertex 0 with edge 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b0, b1) = (&ring[j], &ring[(j + 1) % n]);
            if segments_touch_2d(a0, a1, b0, b1, eps) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Checks the relations between already-cleaned rings (outer first).
pub(super) fn check_rings(rings: &[Vec<Point2>]) -> Result<(), PolygonError> {
    let Some(outer) = rings.first() else {
        return Err(PolygonError::Encoding("no outer ring".to_owned()));
    };
    let (_, eps_area) = scaled_tolerances(outer);

    for a in 0..rings.len() {
        for b in (a + 1)..rings.len() {
            if rings_touch(&rings[a], &rings[b], eps_area) {
                warn!(first = a, second = b, "Rejecting intersecting rings");
                return Err(PolygonError::RingsIntersect {
                    first: a,
                    second: b,
                });
            }
        }
    }

    // With no contact between rings, one vertex decides containment.
    for (index, hole) in rings.iter().enumerate().skip(1) {
        if !point_in_ring(&hole[0], outer) {
            return Err(PolygonError::HoleOutside { ring: index });
        }
        for (other, container) in rings.iter().enumerate().skip(1) {
            if other != index && point_in_ring(&hole[0], container) {
                return Err(PolygonError::NestedHole {
                    ring: index,
                    container: other,
                });
            }
        }
    }
    Ok(())
}

fn rings_touch(a: &[Point2], b: &[Point2], eps: f64) -> bool {
    let (na, nb) = (a.len(), b.len());
    (0..na).any(|i| {
        let (a0, a1) = (&a[i], &a[(i + 1) % na]);
        (0..nb).any(|j| segments_touch_2d(a0, a1, &b[j], &b[(j + 1) % nb], eps))
    })
}
