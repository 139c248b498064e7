//! CPU runtime implementation
//!
//! The CPU runtime is the reference implementation of every kernel and the
//! backend used when no GPU platform is selected.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
