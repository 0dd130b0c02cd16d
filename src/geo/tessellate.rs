//! Ear clipping triangulation of simple polygons, used to fill region shapes.

/// Triangulate a simple polygon ring (open or closed, either winding).
///
/// Returns index triples into `ring`. A ring of `n` distinct vertices yields
/// `n - 2` triangles; degenerate leftovers are fanned.
pub fn triangulate(ring: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = open_len(ring);
    if n < 3 {
        return Vec::new();
    }

    let ccw = signed_area(&ring[..n]) > 0.0;
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    let mut i = 0;
    let mut misses = 0;
    while remaining.len() > 3 {
        let len = remaining.len();
        let (a, b, c) = (
            remaining[(i + len - 1) % len],
            remaining[i % len],
            remaining[(i + 1) % len],
        );

        if is_ear(ring, &remaining, a, b, c, ccw) {
            triangles.push([a, b, c]);
            remaining.remove(i % len);
            misses = 0;
            if i >= remaining.len() {
                i = 0;
            }
        } else {
            i = (i + 1) % len;
            misses += 1;
            if misses > len {
                // Self-intersecting or collinear remainder.
                let pivot = remaining[0];
                for w in remaining[1..].windows(2) {
                    triangles.push([pivot, w[0], w[1]]);
                }
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

/// Signed area, positive for counter-clockwise rings.
pub fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (p, q) = (ring[i], ring[(i + 1) % n]);
            p[0] * q[1] - q[0] * p[1]
        })
        .sum::<f64>()
        / 2.0
}

fn open_len(ring: &[[f64; 2]]) -> usize {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => ring.len() - 1,
        _ => ring.len(),
    }
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn is_ear(ring: &[[f64; 2]], remaining: &[usize], a: usize, b: usize, c: usize, ccw: bool) -> bool {
    let (pa, pb, pc) = (ring[a], ring[b], ring[c]);
    let turn = cross(pa, pb, pc);
    let convex = if ccw { turn > 0.0 } else { turn < 0.0 };
    if !convex {
        return false;
    }

    remaining
        .iter()
        .filter(|&&k| k != a && k != b && k != c)
        .all(|&k| !in_triangle(ring[k], pa, pb, pc))
}

fn in_triangle(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangles_area(ring: &[[f64; 2]], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| signed_area(&[ring[t[0]], ring[t[1]], ring[t[2]]]).abs())
            .sum()
    }

    #[test]
    fn square_gives_two_triangles() {
        let ring = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let tris = triangulate(&ring);
        assert_eq!(tris.len(), 2);
        assert!((triangles_area(&ring, &tris) - 1.0).abs() < 1e-12);
        assert!(tris.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn concave_ring_is_covered_exactly() {
        // clockwise U shape
        let ring = [
            [0.0, 0.0],
            [0.0, 3.0],
            [1.0, 3.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [2.0, 3.0],
            [3.0, 3.0],
            [3.0, 0.0],
        ];
        assert!(signed_area(&ring) < 0.0);

        let tris = triangulate(&ring);
        assert_eq!(tris.len(), ring.len() - 2);
        assert!((triangles_area(&ring, &tris) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rings_yield_nothing() {
        assert!(triangulate(&[]).is_empty());
        assert!(triangulate(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).is_empty());
    }
}
