/// Errors produced while tessellating spheres or packing them into shared buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("degenerate tessellation: {lat_steps} latitude x {long_steps} longitude steps")]
    DegenerateTessellation { lat_steps: u32, long_steps: u32 },

    #[error("sphere buffer is full ({max} spheres)")]
    CapacityExceeded { max: usize },

    #[error("sphere buffer must hold at least one sphere")]
    EmptyCapacity,

    /// The packed vertex count no longer fits the 32-bit index format.
    #[error("{vertices} vertices cannot be addressed by u32 indices")]
    IndexOverflow { vertices: u64 },
}
