//! Per-vertex type tags.
//!
//! The shader reads the tag as a float and picks one of three uniform colors.
//! Host code only deals with `VertexTag`; the float encoding is produced when a
//! record is written into the packed buffer.

use super::SpherePoint;

/// Render role of a single vertex.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum VertexTag {
    /// Sphere surface.
    #[default]
    Surface,
    /// Dot / grid marker.
    Dot,
    /// Bacteria / highlight marker.
    Marker,
}

impl VertexTag {
    /// Value consumed by `sphere.wgsl`.
    #[inline]
    pub const fn encode(self) -> f32 {
        match self {
            VertexTag::Surface => 0.0,
            VertexTag::Dot => 1.0,
            VertexTag::Marker => 2.0,
        }
    }
}

/// What an `add_sphere` call contributes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum SphereKind {
    /// Solid field sphere; tags follow `TagRules`.
    #[default]
    Field,
    /// Wireframe shell drawn with line indices; every vertex is a dot.
    Grid,
    /// Solid point-marker sphere; every vertex is a marker.
    Bacteria,
}

impl SphereKind {
    /// Whether this kind is drawn as a wireframe rather than triangles.
    #[inline]
    pub const fn is_wireframe(self) -> bool {
        matches!(self, SphereKind::Grid)
    }
}

/// A `(lat, long)` grid coordinate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GridPos {
    pub lat: u32,
    pub long: u32,
}

/// Tag resolution for field spheres.
///
/// `dot_spacing` marks every vertex whose coordinates are multiples of the
/// spacing; `marker` marks exactly one vertex. The marker wins when both match.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TagRules {
    pub dot_spacing: Option<GridPos>,
    pub marker: Option<GridPos>,
}

impl TagRules {
    pub fn resolve(&self, kind: SphereKind, point: &SpherePoint) -> VertexTag {
        match kind {
            SphereKind::Grid => VertexTag::Dot,
            SphereKind::Bacteria => VertexTag::Marker,
            SphereKind::Field => {
                let at = GridPos { lat: point.lat, long: point.long };
                if self.marker == Some(at) {
                    VertexTag::Marker
                } else if self.dot_spacing.is_some_and(|s| is_multiple(at, s)) {
                    VertexTag::Dot
                } else {
                    VertexTag::Surface
                }
            }
        }
    }
}

// Zero spacing on an axis means "any value" on that axis.
fn is_multiple(at: GridPos, spacing: GridPos) -> bool {
    let on = |v: u32, s: u32| s == 0 || v % s == 0;
    on(at.lat, spacing.lat) && on(at.long, spacing.long)
}
