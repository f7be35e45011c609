//! Index topology for spheres produced by `build_sphere`.
//!
//! Triangles are wound counter-clockwise when viewed from outside the sphere.
//! Longitude wraps at the seam; latitude never wraps, the poles close the
//! top and bottom.

use super::sphere::{check_steps, vertices_per_sphere};
use super::MeshError;

/// Number of triangle indices emitted for one sphere.
#[inline]
pub const fn triangle_index_count(lat_steps: u32, long_steps: u32) -> usize {
    lat_steps as usize * long_steps as usize * 6
}

/// Triangle indices reserved per sphere in a shared index buffer.
///
/// One ring band larger than what `build_triangle_indices` emits, so a full
/// buffer never needs to grow.
#[inline]
pub const fn triangle_index_capacity(lat_steps: u32, long_steps: u32) -> usize {
    lat_steps as usize * long_steps as usize * 6 + 2 * long_steps as usize * 3
}

/// Number of line indices emitted for one sphere.
#[inline]
pub const fn line_index_count(lat_steps: u32, long_steps: u32) -> usize {
    (2 * lat_steps as usize * long_steps as usize + long_steps as usize) * 2
}

/// Local index arithmetic for one sphere.
#[derive(Debug, Copy, Clone)]
struct Grid {
    lat_steps: u32,
    long_steps: u32,
    offset: u32,
}

impl Grid {
    fn new(lat_steps: u32, long_steps: u32, offset: u32) -> Result<Self, MeshError> {
        check_steps(lat_steps, long_steps)?;

        let end = offset as u64 + vertices_per_sphere(lat_steps, long_steps) as u64;
        if end > u32::MAX as u64 + 1 {
            return Err(MeshError::IndexOverflow { vertices: end });
        }

        Ok(Self { lat_steps, long_steps, offset })
    }

    #[inline]
    fn north(&self) -> u32 {
        self.offset
    }

    #[inline]
    fn south(&self) -> u32 {
        self.offset + self.lat_steps * self.long_steps + 1
    }

    /// Vertex on ring `lat` (1-based), column `long` (wrapped).
    #[inline]
    fn ring(&self, lat: u32, long: u32) -> u32 {
        debug_assert!((1..=self.lat_steps).contains(&lat));
        self.offset + 1 + (lat - 1) * self.long_steps + long % self.long_steps
    }
}

/// Triangle list covering the sphere: two pole fans and the quad bands between rings.
pub fn build_triangle_indices(
    lat_steps: u32,
    long_steps: u32,
    vertex_offset: u32,
) -> Result<Vec<u32>, MeshError> {
    let g = Grid::new(lat_steps, long_steps, vertex_offset)?;
    let mut out = Vec::with_capacity(triangle_index_count(lat_steps, long_steps));

    for j in 0..long_steps {
        out.extend_from_slice(&[g.north(), g.ring(1, j + 1), g.ring(1, j)]);
    }

    for lat in 1..lat_steps {
        for j in 0..long_steps {
            let a = g.ring(lat, j);
            let b = g.ring(lat, j + 1);
            let c = g.ring(lat + 1, j);
            let d = g.ring(lat + 1, j + 1);
            out.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    for j in 0..long_steps {
        out.extend_from_slice(&[g.south(), g.ring(lat_steps, j), g.ring(lat_steps, j + 1)]);
    }

    Ok(out)
}

/// Line list tracing the latitude rings, the meridians and the pole spokes.
pub fn build_line_indices(
    lat_steps: u32,
    long_steps: u32,
    vertex_offset: u32,
) -> Result<Vec<u32>, MeshError> {
    let g = Grid::new(lat_steps, long_steps, vertex_offset)?;
    let mut out = Vec::with_capacity(line_index_count(lat_steps, long_steps));

    for j in 0..long_steps {
        out.extend_from_slice(&[g.north(), g.ring(1, j)]);
    }

    for lat in 1..=lat_steps {
        for j in 0..long_steps {
            out.extend_from_slice(&[g.ring(lat, j), g.ring(lat, j + 1)]);
            if lat < lat_steps {
                out.extend_from_slice(&[g.ring(lat, j), g.ring(lat + 1, j)]);
            }
        }
    }

    for j in 0..long_steps {
        out.extend_from_slice(&[g.south(), g.ring(lat_steps, j)]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::Vec3;

    use super::*;
    use crate::mesh::{build_sphere, MIN_LONG_STEPS};

    #[test]
    fn triangle_count_and_range() {
        for lat_steps in 1..6 {
            for long_steps in MIN_LONG_STEPS..8 {
                let idx = build_triangle_indices(lat_steps, long_steps, 0).unwrap();
                let n = vertices_per_sphere(lat_steps, long_steps) as u32;
                assert_eq!(idx.len(), triangle_index_count(lat_steps, long_steps));
                assert!(idx.len() <= triangle_index_capacity(lat_steps, long_steps));
                assert_eq!(idx.len() % 3, 0);
                assert!(idx.iter().all(|&i| i < n));
            }
        }
    }

    #[test]
    fn capacity_formula() {
        // 2 x 4: 2*4*6 + 2*4*3
        assert_eq!(triangle_index_capacity(2, 4), 72);
        assert_eq!(triangle_index_count(2, 4), 48);
    }

    #[test]
    fn north_cap_is_first_fan() {
        let idx = build_triangle_indices(2, 4, 0).unwrap();
        let cap: Vec<[u32; 3]> = idx[..12].chunks(3).map(|t| [t[0], t[1], t[2]]).collect();
        assert_eq!(cap, vec![[0, 2, 1], [0, 3, 2], [0, 4, 3], [0, 1, 4]]);
    }

    #[test]
    fn south_cap_uses_last_ring() {
        let idx = build_triangle_indices(2, 4, 0).unwrap();
        let cap: Vec<[u32; 3]> = idx[idx.len() - 12..]
            .chunks(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        assert_eq!(cap, vec![[9, 5, 6], [9, 6, 7], [9, 7, 8], [9, 8, 5]]);
    }

    #[test]
    fn latitude_does_not_wrap() {
        // 3 x 4: ring 1 is 1..=4, ring 3 is 9..=12. Only the poles close the mesh.
        let idx = build_triangle_indices(3, 4, 0).unwrap();
        for t in idx.chunks(3) {
            let first = t.iter().any(|i| (1..=4).contains(i));
            let last = t.iter().any(|i| (9..=12).contains(i));
            assert!(!(first && last), "triangle joins first and last ring: {t:?}");
        }

        let distinct: HashSet<[u32; 3]> = idx
            .chunks(3)
            .map(|t| {
                let mut s = [t[0], t[1], t[2]];
                s.sort();
                s
            })
            .collect();
        assert_eq!(distinct.len(), idx.len() / 3);
    }

    #[test]
    fn triangles_face_outward() {
        let (lat_steps, long_steps) = (5, 8);
        let points = build_sphere(Vec3::ZERO, 1.0, lat_steps, long_steps).unwrap();
        let idx = build_triangle_indices(lat_steps, long_steps, 0).unwrap();

        for t in idx.chunks(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| points[i as usize].position());
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward triangle {t:?}");
        }
    }

    #[test]
    fn offset_shifts_every_index() {
        let base = build_triangle_indices(3, 5, 0).unwrap();
        let moved = build_triangle_indices(3, 5, 100).unwrap();
        assert!(base.iter().zip(&moved).all(|(a, b)| a + 100 == *b));

        let base = build_line_indices(3, 5, 0).unwrap();
        let moved = build_line_indices(3, 5, 17).unwrap();
        assert!(base.iter().zip(&moved).all(|(a, b)| a + 17 == *b));
    }

    #[test]
    fn line_segments_cover_grid() {
        let (lat_steps, long_steps) = (3, 6);
        let idx = build_line_indices(lat_steps, long_steps, 0).unwrap();
        assert_eq!(idx.len(), line_index_count(lat_steps, long_steps));

        let segments: HashSet<(u32, u32)> = idx
            .chunks(2)
            .map(|s| (s[0].min(s[1]), s[0].max(s[1])))
            .collect();
        assert_eq!(segments.len(), idx.len() / 2);

        // Seam: last column of ring 1 joins the first.
        assert!(segments.contains(&(1, 6)));
        // Meridian from ring 1 to ring 2.
        assert!(segments.contains(&(1, 7)));
        // No meridian from the last ring back to the first.
        assert!(!segments.contains(&(1, 13)));
        // Pole spokes.
        assert!(segments.contains(&(0, 4)));
        assert!(segments.contains(&(15, 19)));
    }

    #[test]
    fn identical_inputs_identical_output() {
        assert_eq!(
            build_triangle_indices(4, 7, 3).unwrap(),
            build_triangle_indices(4, 7, 3).unwrap()
        );
    }

    #[test]
    fn rejects_degenerate_and_overflowing() {
        assert!(matches!(
            build_triangle_indices(0, 3, 0),
            Err(MeshError::DegenerateTessellation { .. })
        ));
        assert!(matches!(
            build_line_indices(2, 4, u32::MAX - 3),
            Err(MeshError::IndexOverflow { .. })
        ));
        // Fewer than three columns only yield zero-area slivers.
        assert!(matches!(
            build_triangle_indices(2, 1, 0),
            Err(MeshError::DegenerateTessellation { lat_steps: 2, long_steps: 1 })
        ));
        assert!(matches!(
            build_line_indices(3, 2, 0),
            Err(MeshError::DegenerateTessellation { .. })
        ));
    }
}
