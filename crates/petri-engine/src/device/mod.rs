//! GPU device and surface management.
//!
//! Owns the wgpu instance, adapter, device, queue and the window surface, and
//! hands out one encoder + color view per frame.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
