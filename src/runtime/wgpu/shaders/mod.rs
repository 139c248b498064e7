//! WGSL compute shader infrastructure for WebGPU operations
//!
//! # Module Structure
//!
//! - `pipeline` - Pipeline caching, shader validation and dispatch grids
//! - `stats_wgsl` - WGSL source generation for the four passes
//! - `stats` - Pass launchers

pub mod pipeline;
pub mod stats;
pub mod stats_wgsl;

pub use pipeline::{LayoutKey, PipelineCache, WORKGROUP_SIZE};
pub use stats::{StatsParams, encode_histogram, encode_reduce};
