//! Latitude/longitude sphere tessellation.
//!
//! Point ordering (relied on by `topology` and `buffer`):
//! - index `0`: north pole (`lat = 0`)
//! - indices `1 ..= lat_steps * long_steps`: rings top to bottom, each ring
//!   ordered by increasing longitude
//! - last index: south pole (`lat = lat_steps + 1`)

use glam::Vec3;

use super::MeshError;

/// One tessellation vertex tagged with its grid coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpherePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Ring index; `0` and `lat_steps + 1` are the poles.
    pub lat: u32,
    /// Column index; always `0` on the poles.
    pub long: u32,
}

impl SpherePoint {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Number of points `build_sphere` produces for the given resolution.
#[inline]
pub const fn vertices_per_sphere(lat_steps: u32, long_steps: u32) -> usize {
    lat_steps as usize * long_steps as usize + 2
}

/// Fewest columns whose ring encloses any area.
pub const MIN_LONG_STEPS: u32 = 3;

/// Rejects resolutions that would produce no rings, flat rings, or more
/// points than a `u32` index can address.
pub(crate) fn check_steps(lat_steps: u32, long_steps: u32) -> Result<(), MeshError> {
    if lat_steps == 0 || long_steps < MIN_LONG_STEPS {
        return Err(MeshError::DegenerateTessellation { lat_steps, long_steps });
    }

    let vertices = u64::from(lat_steps) * u64::from(long_steps) + 2;
    if vertices > u64::from(u32::MAX) + 1 {
        return Err(MeshError::IndexOverflow { vertices });
    }
    Ok(())
}

/// Cartesian point on a sphere for a polar angle (`lat_deg`, measured from +Y)
/// and an azimuth (`long_deg`, measured from +X towards +Z).
pub fn point_on_sphere(origin: Vec3, radius: f32, lat_deg: f32, long_deg: f32) -> Vec3 {
    let (sin_theta, cos_theta) = lat_deg.to_radians().sin_cos();
    let (sin_phi, cos_phi) = long_deg.to_radians().sin_cos();

    origin + radius * Vec3::new(cos_phi * sin_theta, cos_theta, sin_phi * sin_theta)
}

/// Tessellates a sphere into `lat_steps * long_steps + 2` points.
///
/// Ring `i` (1-based) sits at `i * 180 / (lat_steps + 1)` degrees from the north
/// pole; column `j` at `j * 360 / long_steps` degrees of longitude.
pub fn build_sphere(
    origin: Vec3,
    radius: f32,
    lat_steps: u32,
    long_steps: u32,
) -> Result<Vec<SpherePoint>, MeshError> {
    check_steps(lat_steps, long_steps)?;

    let lat_step_deg = 180.0 / (lat_steps + 1) as f32;
    let long_step_deg = 360.0 / long_steps as f32;

    let mut points = Vec::with_capacity(vertices_per_sphere(lat_steps, long_steps));

    // Poles are placed exactly rather than through sin/cos to keep them on the axis.
    points.push(point_at(origin + Vec3::new(0.0, radius, 0.0), 0, 0));

    for lat in 1..=lat_steps {
        let lat_deg = lat as f32 * lat_step_deg;
        for long in 0..long_steps {
            let p = point_on_sphere(origin, radius, lat_deg, long as f32 * long_step_deg);
            points.push(point_at(p, lat, long));
        }
    }

    points.push(point_at(origin - Vec3::new(0.0, radius, 0.0), lat_steps + 1, 0));

    Ok(points)
}

#[inline]
fn point_at(p: Vec3, lat: u32, long: u32) -> SpherePoint {
    SpherePoint { x: p.x, y: p.y, z: p.z, lat, long }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn unit(lat_steps: u32, long_steps: u32) -> Vec<SpherePoint> {
        build_sphere(Vec3::ZERO, 1.0, lat_steps, long_steps).unwrap()
    }

    #[test]
    fn point_count_and_single_poles() {
        for lat_steps in 1..6 {
            for long_steps in MIN_LONG_STEPS..7 {
                let points = unit(lat_steps, long_steps);
                assert_eq!(points.len(), (lat_steps * long_steps + 2) as usize);
                assert_eq!(points.iter().filter(|p| p.lat == 0).count(), 1);
                assert_eq!(points.iter().filter(|p| p.lat == lat_steps + 1).count(), 1);
            }
        }
    }

    #[test]
    fn every_ring_has_long_steps_points() {
        let points = unit(3, 5);
        for lat in 1..=3 {
            let ring: Vec<_> = points.iter().filter(|p| p.lat == lat).collect();
            assert_eq!(ring.len(), 5);
            for (j, p) in ring.iter().enumerate() {
                assert_eq!(p.long, j as u32);
            }
        }
    }

    #[test]
    fn points_lie_on_sphere() {
        let r = 2.5;
        let points = build_sphere(Vec3::ZERO, r, 7, 11).unwrap();
        for p in &points {
            let d = p.x * p.x + p.y * p.y + p.z * p.z - r * r;
            assert!(d.abs() < 1e-4, "point {p:?} off sphere by {d}");
        }
    }

    #[test]
    fn two_by_four_scenario() {
        let points = unit(2, 4);
        assert_eq!(points.len(), 10);

        let north = points[0];
        assert!((north.y - 1.0).abs() < EPS && north.x.abs() < EPS && north.z.abs() < EPS);

        let south = points[9];
        assert_eq!(south.lat, 3);
        assert!((south.y + 1.0).abs() < EPS && south.x.abs() < EPS && south.z.abs() < EPS);

        let ring: Vec<_> = points.iter().filter(|p| p.lat == 1).collect();
        assert_eq!(ring.len(), 4);
        for p in ring {
            assert!((p.y - 0.5).abs() < EPS, "ring 1 y = {}", p.y);
        }
    }

    #[test]
    fn origin_offsets_every_point() {
        let origin = Vec3::new(1.0, -2.0, 3.0);
        let centred = unit(3, 6);
        let moved = build_sphere(origin, 1.0, 3, 6).unwrap();
        for (a, b) in centred.iter().zip(&moved) {
            assert!((b.position() - a.position() - origin).length() < EPS);
            assert_eq!((a.lat, a.long), (b.lat, b.long));
        }
    }

    #[test]
    fn identical_inputs_identical_output() {
        assert_eq!(unit(4, 9), unit(4, 9));
    }

    #[test]
    fn zero_steps_rejected() {
        assert_eq!(
            build_sphere(Vec3::ZERO, 1.0, 0, 4),
            Err(MeshError::DegenerateTessellation { lat_steps: 0, long_steps: 4 })
        );
        assert!(build_sphere(Vec3::ZERO, 1.0, 4, 0).is_err());
    }

    #[test]
    fn flat_rings_rejected() {
        // One or two columns put every ring on a line or a single point.
        for long_steps in 1..MIN_LONG_STEPS {
            assert_eq!(
                build_sphere(Vec3::ZERO, 1.0, 2, long_steps),
                Err(MeshError::DegenerateTessellation { lat_steps: 2, long_steps })
            );
        }
        assert!(build_sphere(Vec3::ZERO, 1.0, 2, MIN_LONG_STEPS).is_ok());
    }

    #[test]
    fn unaddressable_resolution_is_an_error() {
        assert_eq!(
            build_sphere(Vec3::ZERO, 1.0, u32::MAX, MIN_LONG_STEPS),
            Err(MeshError::IndexOverflow { vertices: u32::MAX as u64 * 3 + 2 })
        );
        assert!(matches!(
            build_sphere(Vec3::ZERO, 1.0, 1 << 16, 1 << 16),
            Err(MeshError::IndexOverflow { .. })
        ));
    }

    #[test]
    fn point_on_sphere_equator() {
        let p = point_on_sphere(Vec3::ZERO, 2.0, 90.0, 90.0);
        assert!(p.x.abs() < EPS && p.y.abs() < EPS && (p.z - 2.0).abs() < EPS);
    }
}
