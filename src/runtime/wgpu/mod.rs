//! WebGPU runtime implementation (requires `wgpu` feature)
//!
//! This module provides cross-platform GPU acceleration via WebGPU. The four
//! passes are WGSL compute shaders; results are read back for the host merge.

mod cache;
mod client;
mod device;
mod runtime;
pub mod shaders;

pub use client::{WgpuClient, WgpuSamples};
pub use device::WgpuDevice;
pub use runtime::{WgpuRuntime, is_wgpu_available};
