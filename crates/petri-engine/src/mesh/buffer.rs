use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::sphere::{build_sphere, check_steps, vertices_per_sphere};
use super::tag::{GridPos, SphereKind, TagRules};
use super::topology::{
    build_line_indices, build_triangle_indices, line_index_count, triangle_index_capacity,
};
use super::MeshError;

/// Scalars per packed vertex: position (3) + tag (1).
pub const VERTEX_STRIDE: usize = 4;

/// Packed vertex as uploaded to the GPU.
///
/// Layout (16 bytes):
///
///  offset  0  position  [f32; 3]  loc 0
///  offset 12  tag       f32       loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexRecord {
    pub position: [f32; 3],
    pub tag: f32,
}

/// Tessellation resolution and capacity shared by every sphere in a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SphereLayout {
    pub lat_steps: u32,
    pub long_steps: u32,
    pub max_spheres: usize,
}

impl Default for SphereLayout {
    fn default() -> Self {
        Self {
            lat_steps: 24,
            long_steps: 32,
            max_spheres: 64,
        }
    }
}

impl SphereLayout {
    #[inline]
    pub const fn vertices_per_sphere(&self) -> usize {
        vertices_per_sphere(self.lat_steps, self.long_steps)
    }

    #[inline]
    pub const fn max_vertices(&self) -> usize {
        self.max_spheres * self.vertices_per_sphere()
    }

    /// Triangle indices reserved for a full buffer.
    #[inline]
    pub const fn max_triangle_indices(&self) -> usize {
        self.max_spheres * triangle_index_capacity(self.lat_steps, self.long_steps)
    }

    /// Line indices reserved for a full buffer.
    #[inline]
    pub const fn max_line_indices(&self) -> usize {
        self.max_spheres * line_index_count(self.lat_steps, self.long_steps)
    }

    /// Checks that the layout tessellates and that a full buffer is addressable with `u32`.
    pub fn validate(&self) -> Result<(), MeshError> {
        check_steps(self.lat_steps, self.long_steps)?;
        if self.max_spheres == 0 {
            return Err(MeshError::EmptyCapacity);
        }

        let vertices = self.max_spheres as u64 * self.vertices_per_sphere() as u64;
        if vertices > u32::MAX as u64 {
            return Err(MeshError::IndexOverflow { vertices });
        }
        Ok(())
    }
}

/// Handle describing where an `add_sphere` call landed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SphereHandle {
    /// Slot index, in insertion order.
    pub index: usize,
    /// Index of the sphere's north pole in the shared vertex buffer.
    pub first_vertex: u32,
    pub kind: SphereKind,
}

/// Shared vertex/index storage for up to `max_spheres` spheres.
///
/// The vertex array is allocated once at full size. Each `add_sphere` writes a
/// fixed-size block at the write cursor and appends its indices; the only way
/// to reclaim space is `clear`.
#[derive(Debug, Clone)]
pub struct SphereBuffer {
    layout: SphereLayout,
    rules: TagRules,

    records: Vec<VertexRecord>,
    triangle_indices: Vec<u32>,
    line_indices: Vec<u32>,

    sphere_count: usize,
}

impl SphereBuffer {
    pub fn new(layout: SphereLayout) -> Result<Self, MeshError> {
        layout.validate()?;

        Ok(Self {
            layout,
            rules: TagRules::default(),
            records: vec![VertexRecord::default(); layout.max_vertices()],
            triangle_indices: Vec::with_capacity(layout.max_triangle_indices()),
            line_indices: Vec::with_capacity(layout.max_line_indices()),
            sphere_count: 0,
        })
    }

    #[inline]
    pub fn layout(&self) -> SphereLayout {
        self.layout
    }

    #[inline]
    pub fn rules(&self) -> TagRules {
        self.rules
    }

    /// Marks field vertices whose `(lat, long)` are multiples of `(phi, theta)` as dots.
    ///
    /// Applies to spheres added after the call.
    pub fn set_dot_position(&mut self, phi: u32, theta: u32) {
        self.rules.dot_spacing = Some(GridPos { lat: phi, long: theta });
    }

    /// Marks the field vertex at `(phi, theta)` as a marker.
    ///
    /// Applies to spheres added after the call.
    pub fn set_bacteria_position(&mut self, phi: u32, theta: u32) {
        self.rules.marker = Some(GridPos { lat: phi, long: theta });
    }

    pub fn set_rules(&mut self, rules: TagRules) {
        self.rules = rules;
    }

    #[inline]
    pub fn sphere_count(&self) -> usize {
        self.sphere_count
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.sphere_count >= self.layout.max_spheres
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sphere_count == 0
    }

    /// The whole allocated vertex array, including unused slots.
    #[inline]
    pub fn records(&self) -> &[VertexRecord] {
        &self.records
    }

    /// Vertex array as flat scalars (`VERTEX_STRIDE` per vertex).
    #[inline]
    pub fn vertex_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records)
    }

    /// Records written by spheres added since the last `clear`.
    #[inline]
    pub fn used_records(&self) -> &[VertexRecord] {
        &self.records[..self.sphere_count * self.layout.vertices_per_sphere()]
    }

    #[inline]
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    #[inline]
    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Tessellates a sphere and appends it to the shared buffers.
    ///
    /// Fails without touching the buffers when all `max_spheres` slots are taken.
    pub fn add_sphere(
        &mut self,
        origin: Vec3,
        radius: f32,
        kind: SphereKind,
    ) -> Result<SphereHandle, MeshError> {
        if self.is_full() {
            return Err(MeshError::CapacityExceeded { max: self.layout.max_spheres });
        }

        let SphereLayout { lat_steps, long_steps, .. } = self.layout;
        let per_sphere = self.layout.vertices_per_sphere();
        let first = self.sphere_count * per_sphere;
        // `validate` guarantees every slot start fits u32.
        let first_vertex = first as u32;

        let points = build_sphere(origin, radius, lat_steps, long_steps)?;
        let indices = if kind.is_wireframe() {
            build_line_indices(lat_steps, long_steps, first_vertex)?
        } else {
            build_triangle_indices(lat_steps, long_steps, first_vertex)?
        };

        let slot = &mut self.records[first..first + per_sphere];
        for (record, point) in slot.iter_mut().zip(&points) {
            *record = VertexRecord {
                position: [point.x, point.y, point.z],
                tag: self.rules.resolve(kind, point).encode(),
            };
        }

        if kind.is_wireframe() {
            self.line_indices.extend_from_slice(&indices);
        } else {
            self.triangle_indices.extend_from_slice(&indices);
        }

        let handle = SphereHandle { index: self.sphere_count, first_vertex, kind };
        self.sphere_count += 1;

        log::trace!(
            "packed {:?} sphere #{} at vertex {} (r = {radius})",
            kind,
            handle.index,
            first_vertex
        );

        Ok(handle)
    }

    /// Forgets every sphere. Allocations are kept for the next frame.
    pub fn clear(&mut self) {
        self.sphere_count = 0;
        self.triangle_indices.clear();
        self.line_indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexTag;

    fn layout(max_spheres: usize) -> SphereLayout {
        SphereLayout { lat_steps: 2, long_steps: 4, max_spheres }
    }

    #[test]
    fn vertex_data_is_sized_once() {
        let buf = SphereBuffer::new(layout(3)).unwrap();
        assert_eq!(buf.vertex_data().len(), 3 * 10 * VERTEX_STRIDE);
        assert!(buf.is_empty());
    }

    #[test]
    fn layout_validation() {
        assert_eq!(SphereBuffer::new(layout(0)).unwrap_err(), MeshError::EmptyCapacity);
        let degenerate = SphereLayout { lat_steps: 0, long_steps: 4, max_spheres: 1 };
        assert!(matches!(
            SphereBuffer::new(degenerate),
            Err(MeshError::DegenerateTessellation { .. })
        ));
        let sliver = SphereLayout { lat_steps: 2, long_steps: 1, max_spheres: 1 };
        assert!(matches!(
            SphereBuffer::new(sliver),
            Err(MeshError::DegenerateTessellation { long_steps: 1, .. })
        ));
        let huge = SphereLayout { lat_steps: 1 << 16, long_steps: 1 << 16, max_spheres: 2 };
        assert!(matches!(huge.validate(), Err(MeshError::IndexOverflow { .. })));
    }

    #[test]
    fn handles_track_cursor() {
        let mut buf = SphereBuffer::new(layout(2)).unwrap();
        let a = buf.add_sphere(Vec3::ZERO, 1.0, SphereKind::Field).unwrap();
        let b = buf.add_sphere(Vec3::X, 1.0, SphereKind::Grid).unwrap();
        assert_eq!((a.index, a.first_vertex), (0, 0));
        assert_eq!((b.index, b.first_vertex), (1, 10));
        assert!(buf.is_full());
    }

    #[test]
    fn grid_goes_to_line_indices() {
        let mut buf = SphereBuffer::new(layout(1)).unwrap();
        buf.add_sphere(Vec3::ZERO, 1.0, SphereKind::Grid).unwrap();
        assert!(buf.triangle_indices().is_empty());
        assert_eq!(buf.line_indices().len(), line_index_count(2, 4));
        assert!(buf.used_records().iter().all(|r| r.tag == VertexTag::Dot.encode()));
    }

    #[test]
    fn field_tags_follow_rules() {
        let mut buf = SphereBuffer::new(layout(1)).unwrap();
        buf.set_dot_position(2, 2);
        buf.set_bacteria_position(1, 1);
        buf.add_sphere(Vec3::ZERO, 1.0, SphereKind::Field).unwrap();

        let tags: Vec<f32> = buf.used_records().iter().map(|r| r.tag).collect();
        // north pole (0,0): dot; ring 1: (1,0) (1,1)* (1,2) (1,3); ring 2: (2,0) (2,1) (2,2) (2,3); south (3,0)
        assert_eq!(tags, vec![1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn clear_resets_cursor_and_indices() {
        let mut buf = SphereBuffer::new(layout(1)).unwrap();
        buf.add_sphere(Vec3::ZERO, 1.0, SphereKind::Bacteria).unwrap();
        assert!(buf.add_sphere(Vec3::ZERO, 1.0, SphereKind::Field).is_err());

        buf.clear();
        assert_eq!(buf.sphere_count(), 0);
        assert!(buf.triangle_indices().is_empty());
        let again = buf.add_sphere(Vec3::Y, 0.5, SphereKind::Field).unwrap();
        assert_eq!(again.first_vertex, 0);
    }
}
