//! Map projection, bounds and hit testing in projected coordinates.

use std::f64::consts::FRAC_PI_4;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Project `[lon, lat]` degrees to Mercator `[x, y]`, both expressed in degrees.
pub fn mercator(lon_lat: [f64; 2]) -> [f64; 2] {
    let lat = lon_lat[1].clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (FRAC_PI_4 + lat / 2.0).tan().ln().to_degrees();
    [lon_lat[0], y]
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds {
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Bounds>, p| {
            Some(match acc {
                None => Bounds { min: *p, max: *p },
                Some(b) => Bounds {
                    min: [b.min[0].min(p[0]), b.min[1].min(p[1])],
                    max: [b.max[0].max(p[0]), b.max[1].max(p[1])],
                },
            })
        })
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Grow each side by `fraction` of the larger extent.
    pub fn padded(self, fraction: f64) -> Bounds {
        let pad = self.width().max(self.height()) * fraction;
        Bounds {
            min: [self.min[0] - pad, self.min[1] - pad],
            max: [self.max[0] + pad, self.max[1] + pad],
        }
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}

/// Uniform scale fitting bounds inside a screen rectangle, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenFit {
    bounds: Bounds,
    scale: f64,
    offset: [f64; 2],
}

impl ScreenFit {
    /// Fit `bounds` centered in a rectangle at `origin` of `size` pixels.
    pub fn new(bounds: Bounds, origin: [f64; 2], size: [f64; 2]) -> Self {
        let w = bounds.width().max(f64::EPSILON);
        let h = bounds.height().max(f64::EPSILON);
        let scale = (size[0] / w).min(size[1] / h);
        let offset = [
            origin[0] + (size[0] - w * scale) / 2.0,
            origin[1] + (size[1] - h * scale) / 2.0,
        ];
        Self {
            bounds,
            scale,
            offset,
        }
    }

    pub fn to_screen(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.offset[0] + (p[0] - self.bounds.min[0]) * self.scale,
            self.offset[1] + (self.bounds.max[1] - p[1]) * self.scale,
        ]
    }

    pub fn from_screen(&self, s: [f64; 2]) -> [f64; 2] {
        [
            self.bounds.min[0] + (s[0] - self.offset[0]) / self.scale,
            self.bounds.max[1] - (s[1] - self.offset[1]) / self.scale,
        ]
    }
}

/// Even-odd ray casting test. The ring may be open or closed.
pub fn point_in_ring(p: [f64; 2], ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x_cross = a[0] + (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
            if p[0] < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_keeps_longitude_and_stretches_latitude() {
        assert_eq!(mercator([-7.6, 0.0]), [-7.6, 0.0]);

        let low = mercator([0.0, 20.0])[1];
        let high = mercator([0.0, 35.0])[1];
        assert!(low > 20.0 && high > 35.0);
        assert!(high - low > 15.0);
        assert!(mercator([0.0, 90.0])[1].is_finite());
    }

    #[test]
    fn bounds_cover_all_points() {
        let pts = [[1.0, 5.0], [-3.0, 2.0], [4.0, -1.0]];
        let b = Bounds::of_points(&pts).unwrap();
        assert_eq!(b.min, [-3.0, -1.0]);
        assert_eq!(b.max, [4.0, 5.0]);
        assert!(Bounds::of_points(&Vec::<[f64; 2]>::new()).is_none());

        let padded = b.padded(0.5);
        assert_eq!(padded.min, [-6.5, -4.5]);
    }

    #[test]
    fn screen_fit_round_trips_and_flips_y() {
        let b = Bounds {
            min: [0.0, 0.0],
            max: [10.0, 5.0],
        };
        let fit = ScreenFit::new(b, [100.0, 50.0], [200.0, 200.0]);

        let top_left = fit.to_screen([0.0, 5.0]);
        assert_eq!(top_left, [100.0, 100.0]);
        let bottom_right = fit.to_screen([10.0, 0.0]);
        assert_eq!(bottom_right, [300.0, 200.0]);

        let back = fit.from_screen(fit.to_screen([3.5, 1.25]));
        assert!((back[0] - 3.5).abs() < 1e-9 && (back[1] - 1.25).abs() < 1e-9);
    }

    #[test]
    fn point_in_concave_ring() {
        // L shape
        let ring = [
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 1.0],
            [1.0, 1.0],
            [1.0, 4.0],
            [0.0, 4.0],
        ];
        assert!(point_in_ring([0.5, 3.0], &ring));
        assert!(point_in_ring([3.0, 0.5], &ring));
        assert!(!point_in_ring([3.0, 3.0], &ring));
        assert!(!point_in_ring([-1.0, 0.5], &ring));
    }
}
